//! Team member business logic - Profiles and their payroll settings.
//!
//! Provides functions for creating, looking up and updating team members, including the
//! per-content-type rate table used by the payroll estimator, and idempotent seeding
//! from `config.toml`.

use crate::{
    config::team::{Config, MemberConfig},
    entities::{Profile, profile},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use std::collections::BTreeMap;

/// Payroll-relevant settings of a member. `None` means "not set" and counts as zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PayrollSettings {
    /// Monthly base salary
    pub base_salary: Option<f64>,
    /// Fixed monthly bonus
    pub bonus_salary: Option<f64>,
    /// KPI bonus base
    pub kpi_bonus: Option<f64>,
    /// Base salary exempt from insurance
    pub insurance_threshold: Option<f64>,
    /// Insurance rate in percent
    pub insurance_percent: Option<f64>,
    /// Tax rate in percent
    pub tax_percent: Option<f64>,
}

impl PayrollSettings {
    fn validate(&self) -> Result<()> {
        let amounts = [
            self.base_salary,
            self.bonus_salary,
            self.kpi_bonus,
            self.insurance_threshold,
        ];
        for amount in amounts.into_iter().flatten() {
            if !amount.is_finite() || amount < 0.0 {
                return Err(Error::InvalidAmount { amount });
            }
        }

        for percent in [self.insurance_percent, self.tax_percent].into_iter().flatten() {
            if !(0.0..=100.0).contains(&percent) {
                return Err(Error::InvalidAmount { amount: percent });
            }
        }

        Ok(())
    }
}

impl From<&MemberConfig> for PayrollSettings {
    fn from(config: &MemberConfig) -> Self {
        Self {
            base_salary: config.base_salary,
            bonus_salary: config.bonus_salary,
            kpi_bonus: config.kpi_bonus,
            insurance_threshold: config.insurance_threshold,
            insurance_percent: config.insurance_percent,
            tax_percent: config.tax_percent,
        }
    }
}

/// Everything needed to create a team member.
#[derive(Debug, Clone, Default)]
pub struct NewMember {
    /// Display name
    pub name: String,
    /// Job title
    pub position: Option<String>,
    /// Linked Discord user ID
    pub discord_id: Option<String>,
    /// Payroll settings
    pub payroll: PayrollSettings,
    /// Flat bonus per delivered content item, by content type
    pub content_rates: BTreeMap<String, f64>,
}

fn rates_to_json(rates: &BTreeMap<String, f64>) -> Option<Json> {
    if rates.is_empty() {
        None
    } else {
        Some(serde_json::json!(rates))
    }
}

/// Creates a team member after validating the name and payroll settings.
pub async fn create_member(db: &DatabaseConnection, new_member: NewMember) -> Result<profile::Model> {
    let name = new_member.name.trim().to_string();
    if name.is_empty() {
        return Err(Error::Config {
            message: "Member name cannot be empty".to_string(),
        });
    }
    new_member.payroll.validate()?;
    for rate in new_member.content_rates.values() {
        if !rate.is_finite() || *rate < 0.0 {
            return Err(Error::InvalidAmount { amount: *rate });
        }
    }

    let payroll = new_member.payroll;
    let model = profile::ActiveModel {
        name: Set(name),
        position: Set(new_member.position),
        discord_id: Set(new_member.discord_id),
        base_salary: Set(payroll.base_salary),
        bonus_salary: Set(payroll.bonus_salary),
        kpi_bonus: Set(payroll.kpi_bonus),
        insurance_threshold: Set(payroll.insurance_threshold),
        insurance_percent: Set(payroll.insurance_percent),
        tax_percent: Set(payroll.tax_percent),
        content_rates: Set(rates_to_json(&new_member.content_rates)),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Finds a member by id.
pub async fn get_member_by_id(
    db: &DatabaseConnection,
    member_id: i64,
) -> Result<Option<profile::Model>> {
    Profile::find_by_id(member_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a member by name, ignoring case and surrounding whitespace.
pub async fn get_member_by_name(
    db: &DatabaseConnection,
    name: &str,
) -> Result<Option<profile::Model>> {
    let wanted = name.trim().to_lowercase();
    Ok(get_all_members(db)
        .await?
        .into_iter()
        .find(|m| m.name.to_lowercase() == wanted))
}

/// Finds the member linked to a Discord user.
pub async fn get_member_by_discord_id(
    db: &DatabaseConnection,
    discord_id: &str,
) -> Result<Option<profile::Model>> {
    Profile::find()
        .filter(profile::Column::DiscordId.eq(discord_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// All members, ordered alphabetically by name.
pub async fn get_all_members(db: &DatabaseConnection) -> Result<Vec<profile::Model>> {
    Profile::find()
        .order_by_asc(profile::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces a member's payroll settings.
pub async fn update_payroll_settings(
    db: &DatabaseConnection,
    member_id: i64,
    settings: PayrollSettings,
) -> Result<profile::Model> {
    settings.validate()?;

    let existing = get_member_by_id(db, member_id)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            id: member_id.to_string(),
        })?;

    let mut active: profile::ActiveModel = existing.into();
    active.base_salary = Set(settings.base_salary);
    active.bonus_salary = Set(settings.bonus_salary);
    active.kpi_bonus = Set(settings.kpi_bonus);
    active.insurance_threshold = Set(settings.insurance_threshold);
    active.insurance_percent = Set(settings.insurance_percent);
    active.tax_percent = Set(settings.tax_percent);

    active.update(db).await.map_err(Into::into)
}

/// Sets the flat rate for one content type, keeping the other entries.
///
/// The key is stored as given; matching against content items ignores case and
/// surrounding whitespace, so an existing entry that differs only in case is replaced.
pub async fn set_content_rate(
    db: &DatabaseConnection,
    member_id: i64,
    content_type: &str,
    rate: f64,
) -> Result<profile::Model> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(Error::InvalidAmount { amount: rate });
    }
    let key = content_type.trim();
    if key.is_empty() {
        return Err(Error::Config {
            message: "Content type cannot be empty".to_string(),
        });
    }

    let existing = get_member_by_id(db, member_id)
        .await?
        .ok_or_else(|| Error::MemberNotFound {
            id: member_id.to_string(),
        })?;

    let mut rates = match existing.content_rates.clone() {
        Some(Json::Object(map)) => map,
        _ => serde_json::Map::new(),
    };
    let lowered = key.to_lowercase();
    rates.retain(|existing_key, _| existing_key.trim().to_lowercase() != lowered);
    rates.insert(key.to_string(), Json::from(rate));

    let mut active: profile::ActiveModel = existing.into();
    active.content_rates = Set(Some(Json::Object(rates)));
    active.update(db).await.map_err(Into::into)
}

/// Creates every configured member whose name does not exist yet.
///
/// Returns the number of members created.
pub async fn seed_members(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    let mut created = 0;

    for member_config in &config.members {
        if get_member_by_name(db, &member_config.name).await?.is_some() {
            tracing::debug!("Member '{}' already exists, skipping", member_config.name);
            continue;
        }

        create_member(
            db,
            NewMember {
                name: member_config.name.clone(),
                position: member_config.position.clone(),
                discord_id: member_config.discord_id.clone(),
                payroll: PayrollSettings::from(member_config),
                content_rates: member_config.content_rates.clone(),
            },
        )
        .await?;
        created += 1;
    }

    if created > 0 {
        tracing::info!("Seeded {} team members from config", created);
    }
    Ok(created)
}
