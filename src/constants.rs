pub const DEFAULT_API_URL: &str = "https://miniplayparty.fly.dev";

pub const USER_AGENT: &str = "PlayParty/1.0";

pub mod keys {

    /// Session cache key holding the bearer token.
    pub const SESSION_TOKEN: &str = "auth_token";

    /// Document key / file stem of the stored credential record.
    pub const CREDENTIALS: &str = "user_credentials";
}

pub mod generation {

    pub const USERNAME_ALPHABET: &[u8] =
        b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    pub const PASSWORD_ALPHABET: &[u8] =
        b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789!@#$%^&*";

    pub const USERNAME_SUFFIX_LEN: usize = 8;

    pub const USERNAME_MIN_LEN: usize = 3;

    pub const USERNAME_MAX_LEN: usize = 30;

    /// Leaves room for the random suffix under `USERNAME_MAX_LEN`.
    pub const USERNAME_MAX_BASE_LEN: usize = USERNAME_MAX_LEN - USERNAME_SUFFIX_LEN;

    pub const USERNAME_FALLBACK_BASE: &str = "user";

    pub const PASSWORD_LEN: usize = 32;

    pub const PASSWORD_MIN_LEN: usize = 6;

    pub const PASSWORD_MAX_LEN: usize = 200;
}

pub mod limits {

    pub const MAX_REGISTRATION_ATTEMPTS: u32 = 5;
}
