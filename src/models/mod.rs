pub mod conversation;
pub mod site;

pub use conversation::{ ConversationTurn, FunctionCall, FunctionResponse, Part, Role };
pub use site::GeneratedSite;
