pub const MAX_MESSAGE_LENGTH: usize = 1000;
pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 100;

pub struct Env {
    pub jwt_secret: String,
    pub database_url: String,
    pub redis_url: String,
    pub frontend_url: String,
    pub ip: String,
    pub port: u16,
    pub user_cache_ttl: u64,
    pub allow_post_after_unmatch: bool,
}

impl Env {
    fn new() -> Self {
        let jwt_secret = std::env::var("SECRET_KEY")
            .expect("SECRET_KEY must be set in .env file or environment variable");

        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set in .env file or environment variable");
        let redis_url = std::env::var("REDIS_URL")
            .expect("REDIS_URL must be set in .env file or environment variable");

        let frontend_url =
            std::env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());
        let ip = std::env::var("IP").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .expect("PORT must be a valid u16 integer");

        let user_cache_ttl = std::env::var("USER_CACHE_TTL")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()
            .expect("USER_CACHE_TTL must be a valid u64 integer");

        // Policy for rooms whose match was retracted: keep accepting new messages by default.
        let allow_post_after_unmatch = std::env::var("ALLOW_POST_AFTER_UNMATCH")
            .unwrap_or_else(|_| "true".to_string())
            .parse::<bool>()
            .expect("ALLOW_POST_AFTER_UNMATCH must be true or false");

        Env {
            jwt_secret,
            database_url,
            redis_url,
            frontend_url,
            ip,
            port,
            user_cache_ttl,
            allow_post_after_unmatch,
        }
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}
