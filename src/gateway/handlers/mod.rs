pub(crate) mod chat;
pub(crate) mod chats;
pub(crate) mod usage;
