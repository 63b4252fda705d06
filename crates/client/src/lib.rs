//! Client side of Materna: invokes the server functions, keeps the last
//! result around as chat context, and runs the chat overlay.

pub mod chat;
pub mod command;
pub mod context;
pub mod functions;

pub use chat::{ChatError, ChatMessage, ChatSession, ChatTransport, HttpChatTransport, SendPolicy};
pub use command::Command;
pub use context::ResultContext;
pub use functions::{FunctionsClient, Invocation, InvokeError};

use store::{Stores, UserProfileRecord};

/// Upsert the signed-in user's profile row. Any failure is logged and
/// dropped; sign-in carries on either way.
pub async fn sync_profile(stores: &Stores, record: &UserProfileRecord) -> bool {
    let Some(store) = stores.profiles.get() else {
        return false;
    };
    stores.profiles.settle(store.upsert_profile(record).await).is_some()
}
