// ABOUTME: Common data models for users, activities, nutrition, and workout plans
// ABOUTME: Serde-serializable domain types shared by the database layer and route handlers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stride Fitness

//! Domain models for the Stride API.
//!
//! These types are the single source of truth for the shapes persisted by
//! the database layer and serialized by route handlers. Enum wire formats
//! are lowercase snake_case strings.

/// Security audit event types
pub mod audit;

pub use audit::{AuditEvent, AuditEventType, AuditSeverity};

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role for the permission system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user: may only touch their own resources
    User,
    /// Administrator: user management, analytics, audit access
    Admin,
}

impl UserRole {
    /// String form used in the database and JWT claims
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }

    /// Parse from a stored string, defaulting unknown values to `User`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            _ => Self::User,
        }
    }
}

/// Account lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// Registered, awaiting admin approval
    Pending,
    /// Approved and fully usable
    Active,
    /// Blocked by an admin; cannot authenticate
    Suspended,
}

impl UserStatus {
    /// String form used in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Suspended => "suspended",
        }
    }

    /// Parse from a stored string, defaulting unknown values to `Pending`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "suspended" => Self::Suspended,
            _ => Self::Pending,
        }
    }

    /// Whether a user in this status may authenticate at all
    #[must_use]
    pub const fn can_login(self) -> bool {
        !matches!(self, Self::Suspended)
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered user account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user identifier
    pub id: Uuid,
    /// Email address (unique)
    pub email: String,
    /// Optional display name
    pub display_name: Option<String>,
    /// Bcrypt password hash; never serialized into responses
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Permission role
    pub role: UserRole,
    /// Account lifecycle status
    pub user_status: UserStatus,
    /// Soft-disable flag
    pub is_active: bool,
    /// Admin who approved the account, if any
    pub approved_by: Option<Uuid>,
    /// When the account was approved
    pub approved_at: Option<DateTime<Utc>>,
    /// Profile: body weight in kilograms
    pub weight_kg: Option<f64>,
    /// Profile: height in centimeters
    pub height_cm: Option<f64>,
    /// Profile: date of birth
    pub date_of_birth: Option<NaiveDate>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
    /// Last request timestamp
    pub last_active: DateTime<Utc>,
}

impl User {
    /// Create a new pending user with default profile fields
    #[must_use]
    pub fn new(email: String, password_hash: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email,
            display_name,
            password_hash,
            role: UserRole::User,
            user_status: UserStatus::Pending,
            is_active: true,
            approved_by: None,
            approved_at: None,
            weight_kg: None,
            height_cm: None,
            date_of_birth: None,
            created_at: now,
            last_active: now,
        }
    }
}

/// Sport discipline of a logged activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SportType {
    /// Running (road or trail)
    Run,
    /// Cycling
    Ride,
    /// Swimming
    Swim,
    /// Walking or hiking
    Walk,
    /// Gym strength session
    Strength,
    /// Yoga or mobility session
    Yoga,
    /// Anything else
    Other,
}

impl SportType {
    /// String form used in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Run => "run",
            Self::Ride => "ride",
            Self::Swim => "swim",
            Self::Walk => "walk",
            Self::Strength => "strength",
            Self::Yoga => "yoga",
            Self::Other => "other",
        }
    }
}

impl FromStr for SportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "run" => Ok(Self::Run),
            "ride" => Ok(Self::Ride),
            "swim" => Ok(Self::Swim),
            "walk" => Ok(Self::Walk),
            "strength" => Ok(Self::Strength),
            "yoga" => Ok(Self::Yoga),
            "other" => Ok(Self::Other),
            _ => Err(format!("unknown sport type: {s}")),
        }
    }
}

/// A logged workout session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Unique activity identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Sport discipline
    pub sport: SportType,
    /// Short title
    pub title: String,
    /// Free-form notes (sanitized before storage)
    pub notes: Option<String>,
    /// When the session started
    pub started_at: DateTime<Utc>,
    /// Session length in seconds
    pub duration_seconds: i64,
    /// Distance covered in meters, if applicable
    pub distance_meters: Option<f64>,
    /// Estimated energy expenditure in kcal
    pub calories: Option<f64>,
    /// Average heart rate in bpm
    pub average_heart_rate: Option<i32>,
    /// Maximum heart rate in bpm
    pub max_heart_rate: Option<i32>,
    /// Rate of perceived exertion, 1-10
    pub perceived_exertion: Option<i32>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// Meal slot of a nutrition entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    /// Morning meal
    Breakfast,
    /// Midday meal
    Lunch,
    /// Evening meal
    Dinner,
    /// Anything between meals
    Snack,
}

impl MealType {
    /// String form used in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

impl FromStr for MealType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(Self::Breakfast),
            "lunch" => Ok(Self::Lunch),
            "dinner" => Ok(Self::Dinner),
            "snack" => Ok(Self::Snack),
            _ => Err(format!("unknown meal type: {s}")),
        }
    }
}

/// A logged meal or snack
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionEntry {
    /// Unique entry identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// When the food was consumed
    pub logged_at: DateTime<Utc>,
    /// Meal slot
    pub meal: MealType,
    /// What was eaten (sanitized before storage)
    pub description: String,
    /// Energy in kcal
    pub calories: f64,
    /// Protein in grams
    pub protein_g: Option<f64>,
    /// Carbohydrates in grams
    pub carbs_g: Option<f64>,
    /// Fat in grams
    pub fat_g: Option<f64>,
    /// Reference to an external food record, if the entry came from search
    pub food_ref: Option<i64>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
}

/// Difficulty rating of a workout plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// New to training
    Beginner,
    /// Consistent training history
    Intermediate,
    /// Competitive or long training history
    Advanced,
}

impl Difficulty {
    /// String form used in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(format!("unknown difficulty: {s}")),
        }
    }
}

/// Where a workout plan came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanSource {
    /// Built by the user
    Custom,
    /// Assembled from the exercise catalog proxy
    Catalog,
}

impl PlanSource {
    /// String form used in the database
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "custom",
            Self::Catalog => "catalog",
        }
    }

    /// Parse from a stored string, defaulting unknown values to `Custom`
    #[must_use]
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "catalog" => Self::Catalog,
            _ => Self::Custom,
        }
    }
}

/// One exercise slot inside a workout plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedExercise {
    /// Exercise name
    pub name: String,
    /// External catalog exercise id, if sourced from the proxy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_id: Option<i64>,
    /// Number of sets
    pub sets: u32,
    /// Repetitions per set (None for time-based work)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    /// Duration in seconds for time-based work
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    /// Rest between sets in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest_seconds: Option<u32>,
}

/// A structured workout plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    /// Unique plan identifier
    pub id: Uuid,
    /// Owning user
    pub user_id: Uuid,
    /// Plan name
    pub name: String,
    /// Optional description (sanitized before storage)
    pub description: Option<String>,
    /// Plan length in weeks
    pub weeks: u32,
    /// Training sessions per week
    pub sessions_per_week: u32,
    /// Difficulty rating
    pub difficulty: Difficulty,
    /// Plan origin
    pub source: PlanSource,
    /// Ordered exercise slots
    pub exercises: Vec<PlannedExercise>,
    /// Row creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// One recorded API request, feeding the usage analytics endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiUsage {
    /// Row id (assigned by the database)
    pub id: Option<i64>,
    /// Authenticated user, if any
    pub user_id: Option<Uuid>,
    /// Normalized route path (e.g. `/api/activities`)
    pub endpoint: String,
    /// HTTP method
    pub method: String,
    /// Response status code
    pub status_code: u16,
    /// Handler latency in milliseconds
    pub response_time_ms: Option<u32>,
    /// Client IP address
    pub ip_address: Option<String>,
    /// Client user agent
    pub user_agent: Option<String>,
    /// When the request was made
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn user_status_round_trips_through_strings() {
        for status in [UserStatus::Pending, UserStatus::Active, UserStatus::Suspended] {
            assert_eq!(UserStatus::from_str_lossy(status.as_str()), status);
        }
        assert_eq!(UserStatus::from_str_lossy("garbage"), UserStatus::Pending);
    }

    #[test]
    fn suspended_users_cannot_login() {
        assert!(UserStatus::Pending.can_login());
        assert!(UserStatus::Active.can_login());
        assert!(!UserStatus::Suspended.can_login());
    }

    #[test]
    fn sport_type_parses_known_values() {
        assert_eq!("run".parse::<SportType>(), Ok(SportType::Run));
        assert_eq!("strength".parse::<SportType>(), Ok(SportType::Strength));
        assert!("skydiving".parse::<SportType>().is_err());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User::new(
            "a@example.com".to_owned(),
            "hash".to_owned(),
            Some("A".to_owned()),
        );
        let json = serde_json::to_value(&user).expect("serialize user");
        assert!(json.get("password_hash").is_none());
    }
}
