//! Offline chat assistant that answers messages by picking and calling an
//! indexed function.

mod assistant;
mod conversation;
mod extract;
mod finder;
mod reflect;

use thiserror::Error;

use crate::IndexError;

pub use assistant::{Assistant, NO_HELP, Reply};
pub use conversation::{Conversation, Message, Role, SYSTEM_PROMPT};
pub use extract::ArgumentExtractor;
pub use finder::{Candidate, FunctionFinder};
pub use reflect::{Reflector, TemplateReflector};

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("cannot fill parameter `{parameter}` of `{function}` from the message")]
    MissingArgument { function: String, parameter: String },

    #[error(transparent)]
    Index(#[from] IndexError),
}
