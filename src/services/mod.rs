// Startpage services
// Collaborators around the ordered collections: identity, credential cache,
// calendar feed, link safety and settings.

pub mod calendar_feed;
pub mod credential_cache;
pub mod identity_provider;
pub mod link_safety;
pub mod settings_engine;
