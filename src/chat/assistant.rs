use serde_json::Value;

use super::{
    ArgumentExtractor, ChatError, Conversation, FunctionFinder, Message, Reflector, Role,
    TemplateReflector,
};
use crate::{FunctionCall, FunctionIndexer};

pub const NO_HELP: &str = "I am sorry but I cannot help you with that any further.";

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    /// Name of the function that produced the answer.
    pub function: Option<String>,
    pub result: Option<Value>,
}

impl Reply {
    fn no_help() -> Self {
        Self {
            text: NO_HELP.to_string(),
            function: None,
            result: None,
        }
    }
}

/// Answers user messages with the indexed functions of a registry.
///
/// Each message is reflected on, the reflection is matched against the
/// registry's declarations, and the best candidate whose arguments can be
/// read from the message is invoked through its hash.
pub struct Assistant<'a, R = TemplateReflector> {
    indexer: &'a FunctionIndexer,
    reflector: R,
    finder: FunctionFinder,
    extractor: ArgumentExtractor,
    conversation: Conversation,
}

impl<'a> Assistant<'a> {
    pub fn new(indexer: &'a FunctionIndexer) -> Self {
        Self::with_reflector(indexer, TemplateReflector)
    }
}

impl<'a, R: Reflector> Assistant<'a, R> {
    pub fn with_reflector(indexer: &'a FunctionIndexer, reflector: R) -> Self {
        Self {
            indexer,
            reflector,
            finder: FunctionFinder::default(),
            extractor: ArgumentExtractor::default(),
            conversation: Conversation::default(),
        }
    }

    pub fn with_finder(mut self, finder: FunctionFinder) -> Self {
        self.finder = finder;
        self
    }

    pub fn with_extractor(mut self, extractor: ArgumentExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Answers one message, recording every step in the conversation.
    ///
    /// Replies with [`NO_HELP`] when no indexed function fits. Errors only
    /// when the chosen function fails; the failure is recorded in the
    /// conversation instead of the call announcement.
    pub fn respond(&mut self, message: &str) -> Result<Reply, ChatError> {
        self.conversation.push(Message::new(Role::User, message));
        let reflection = self.reflector.reflect(message);
        self.conversation
            .push(Message::new(Role::Assistant, reflection.as_str()));

        for candidate in self.finder.find(self.indexer, &reflection) {
            let decl = candidate.decl;
            let arguments = match self.extractor.extract(&decl, message) {
                Ok(arguments) => arguments,
                Err(err) => {
                    tracing::debug!(function = %decl.name, %err, "skipping candidate");
                    continue;
                }
            };

            tracing::info!(function = %decl.name, %arguments, "calling function");
            let result = match self.indexer.call(FunctionCall::new(decl.hash, arguments)) {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(function = %decl.name, %err, "function call failed");
                    self.conversation.push(Message::new(
                        Role::Assistant,
                        format!("Calling {} failed: {err}", decl.name),
                    ));
                    return Err(err.into());
                }
            };
            self.conversation.push(Message::new(
                Role::Assistant,
                format!("I have found a function to call: {}", decl.name),
            ));

            let text = render(&result);
            self.conversation
                .push(Message::function(decl.name.as_str(), text.as_str()));
            return Ok(Reply {
                text,
                function: Some(decl.name),
                result: Some(result),
            });
        }

        tracing::info!(query = message, "no function found");
        self.conversation.push(Message::new(Role::Assistant, NO_HELP));
        Ok(Reply::no_help())
    }
}

fn render(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_indexer() -> FunctionIndexer {
        let mut indexer = FunctionIndexer::new();
        indexer.index_module("findex_rs::travel::weather").unwrap();
        indexer
    }

    #[test]
    fn test_weather_question() {
        let indexer = weather_indexer();
        assert!(!indexer.is_empty());
        let mut assistant = Assistant::new(&indexer);

        let reply = assistant.respond("What is the weather in Paris?").unwrap();
        assert_eq!(reply.function.as_deref(), Some("current_weather"));
        assert_eq!(reply.result.unwrap()["location"], "Paris");

        let roles: Vec<Role> = assistant
            .conversation()
            .messages()
            .iter()
            .map(|m| m.role)
            .collect();
        assert_eq!(
            roles,
            [Role::System, Role::User, Role::Assistant, Role::Assistant, Role::Function]
        );
    }

    fn weather_alert(location: String) -> String {
        format!("No alerts for {location}")
    }

    #[test]
    fn test_failed_call_is_recorded() {
        let mut indexer = FunctionIndexer::new();
        indexer
            .index_function(crate::call_site!(), weather_alert)
            .unwrap();
        let mut assistant = Assistant::new(&indexer);

        // runtime-indexed functions take positional arguments the extractor cannot fill
        let err = assistant
            .respond("Is there a weather alert in Paris?")
            .unwrap_err();
        assert!(matches!(err, ChatError::Index(_)));

        let messages = assistant.conversation().messages();
        assert!(
            messages
                .iter()
                .all(|m| !m.content.starts_with("I have found a function to call"))
        );
        let last = assistant.conversation().last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert!(last.content.starts_with("Calling weather_alert failed"));
    }

    #[test]
    fn test_no_help() {
        let indexer = weather_indexer();
        let mut assistant = Assistant::new(&indexer);
        let reply = assistant.respond("Tell me a joke").unwrap();
        assert_eq!(reply, Reply::no_help());
        assert_eq!(assistant.conversation().last().unwrap().content, NO_HELP);
    }

    #[test]
    fn test_skips_candidates_without_arguments() {
        let indexer = weather_indexer();
        let mut assistant = Assistant::new(&indexer);
        // no place name, so nothing can be called
        let reply = assistant.respond("what is the humidity").unwrap();
        assert_eq!(reply.text, NO_HELP);
    }

    #[test]
    fn test_scalar_result_rendering() {
        let indexer = weather_indexer();
        let mut assistant = Assistant::new(&indexer);
        let reply = assistant.respond("What is the humidity in Bergen?").unwrap();
        assert_eq!(reply.function.as_deref(), Some("humidity"));
        let humidity: u32 = reply.text.parse().unwrap();
        assert!(humidity <= 100);
    }
}
