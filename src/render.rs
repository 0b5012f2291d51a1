//! Screen composition and terminal painting.

pub mod composer;
pub mod terminal;

pub use composer::{
    compose_content, compose_one_screen, compose_status, ContentFrame, ContentInputs, Message,
    StatusInputs,
};
pub use terminal::{ScreenFrame, TerminalUi};
