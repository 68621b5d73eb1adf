// config.rs
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt_secret: String,
    pub job_token: Option<String>,
    pub vodafone_cash_number: String,
    pub deposit_rate: f64,
    pub payment_window_minutes: i64,
    pub stale_booking_days: i64,
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        AppConfig {
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET")
                .expect("JWT_SECRET must be set"),
            // When unset the job endpoints accept unauthenticated calls
            // (local development only).
            job_token: env::var("JOB_TOKEN").ok(),
            vodafone_cash_number: env::var("VODAFONE_CASH_NUMBER")
                .unwrap_or_else(|_| "01128414829".to_string()),
            deposit_rate: env::var("DEPOSIT_RATE")
                .unwrap_or_else(|_| "0.10".to_string())
                .parse()
                .expect("DEPOSIT_RATE must be a number"),
            payment_window_minutes: env::var("PAYMENT_WINDOW_MINUTES")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .expect("PAYMENT_WINDOW_MINUTES must be a number"),
            stale_booking_days: env::var("STALE_BOOKING_DAYS")
                .unwrap_or_else(|_| "7".to_string())
                .parse()
                .expect("STALE_BOOKING_DAYS must be a number"),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("PORT must be a number"),
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
        }
    }
}
