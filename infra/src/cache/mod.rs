//! Cache module for Redis-backed storage
//!
//! Provides the retrying Redis client and the Redis implementation of the
//! OTP challenge store. Challenges expire through Redis key TTLs.

pub mod otp_store;
pub mod redis_client;


pub use otp_store::RedisOtpChallengeRepository;
pub use redis_client::RedisClient;

pub use hl_shared::CacheConfig;
