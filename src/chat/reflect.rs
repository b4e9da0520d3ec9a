/// Turns a user message into a short reflection on what the user wants.
///
/// The reflection, not the raw message, is what gets matched against
/// function descriptions.
pub trait Reflector {
    fn reflect(&self, message: &str) -> String;
}

/// Offline reflector that restates the request from a fixed template.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateReflector;

impl Reflector for TemplateReflector {
    fn reflect(&self, message: &str) -> String {
        let gist = message
            .trim()
            .trim_end_matches(|c: char| c == '?' || c == '.' || c == '!')
            .trim();
        if gist.is_empty() {
            return "It is not clear yet what you would like to achieve.".to_string();
        }
        format!(
            "You would like help with the following: {gist}. \
             Let me find the right way to get that for you."
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflection_restates_request() {
        let r = TemplateReflector.reflect("What is the weather in Paris?");
        assert!(r.contains("What is the weather in Paris."));
        assert!(!r.contains('?'));
    }

    #[test]
    fn test_empty_message() {
        assert!(TemplateReflector.reflect("  ?! ").starts_with("It is not clear"));
    }
}
