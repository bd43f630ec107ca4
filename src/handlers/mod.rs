pub mod analytics;
pub mod health;
pub mod internal;
pub mod userinfo;
