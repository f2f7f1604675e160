use thiserror::Error;
use tracing::info;

use crate::model::User;
use crate::store::{KeyValueStore, Storage, StoreError};

/// Car colors a new player can pick from.
pub const AVATAR_COLORS: [&str; 10] = [
    "#EF4444", "#F59E0B", "#10B981", "#3B82F6", "#8B5CF6", "#EC4899", "#06B6D4", "#14B8A6",
    "#F97316", "#84CC16",
];

pub const DEFAULT_AVATAR_COLOR: &str = AVATAR_COLORS[0];

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Please fill in all fields")]
    MissingFields,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unknown car color `{0}`, pick one of: {colors}", colors = AVATAR_COLORS.join(", "))]
    UnknownColor(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub avatar_color: String,
}

impl NewAccount {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            avatar_color: DEFAULT_AVATAR_COLOR.to_string(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.avatar_color = color.into();
        self
    }
}

/// Create a player and make it the current one.
pub fn sign_up<K: KeyValueStore>(
    storage: &mut Storage<K>,
    account: NewAccount,
) -> Result<User, AccountError> {
    let username = account.username.trim();
    let email = account.email.trim();

    if username.is_empty() || email.is_empty() {
        return Err(AccountError::MissingFields);
    }

    let color = AVATAR_COLORS
        .iter()
        .find(|c| c.eq_ignore_ascii_case(account.avatar_color.trim()))
        .ok_or_else(|| AccountError::UnknownColor(account.avatar_color.clone()))?;

    if storage.find_user_by_email(email)?.is_some() {
        return Err(AccountError::EmailTaken);
    }
    if storage.find_user_by_username(username)?.is_some() {
        return Err(AccountError::UsernameTaken);
    }

    let user = User::new(username, email, *color);
    storage.save_user(&user)?;
    storage.set_current_user(Some(&user))?;

    info!(user = %user.username, "signed up");
    Ok(user)
}

/// Make the player registered under `email` the current one.
pub fn sign_in<K: KeyValueStore>(storage: &mut Storage<K>, email: &str) -> Result<User, AccountError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AccountError::MissingFields);
    }

    let user = storage
        .find_user_by_email(email)?
        .ok_or(AccountError::InvalidCredentials)?;
    storage.set_current_user(Some(&user))?;

    info!(user = %user.username, "signed in");
    Ok(user)
}

pub fn sign_out<K: KeyValueStore>(storage: &mut Storage<K>) -> Result<(), AccountError> {
    storage.set_current_user(None)?;
    info!("signed out");
    Ok(())
}
