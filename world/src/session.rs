//! Per-session economy, progress and modifiers.

use std::time::Duration;

use voxel_defence_core::{
    Difficulty, EconomyConfig, Hero, HeroAbility, SessionPhase, SessionStats, TowerId,
    HERO_ABILITY_DURATION, MAX_TIME_SCALE,
};

#[derive(Clone, Debug)]
pub(crate) struct Session {
    pub(crate) phase: SessionPhase,
    pub(crate) hero: Hero,
    pub(crate) difficulty: Difficulty,
    pub(crate) autonomous: bool,
    pub(crate) money: u32,
    pub(crate) lives: i32,
    pub(crate) waves_started: u32,
    pub(crate) wave_active: bool,
    pub(crate) selection: Option<TowerId>,
    pub(crate) time_scale: f32,
    ability_expires_at: Option<Duration>,
}

impl Session {
    pub(crate) fn menu() -> Self {
        Self {
            phase: SessionPhase::Menu,
            hero: Hero::default(),
            difficulty: Difficulty::default(),
            autonomous: false,
            money: 0,
            lives: 0,
            waves_started: 0,
            wave_active: false,
            selection: None,
            time_scale: 1.0,
            ability_expires_at: None,
        }
    }

    /// Fresh session that keeps the host-controlled time scale.
    pub(crate) fn start(
        &self,
        hero: Hero,
        difficulty: Difficulty,
        autonomous: bool,
        economy: &EconomyConfig,
    ) -> Self {
        Self {
            phase: SessionPhase::Playing,
            hero,
            difficulty,
            autonomous,
            money: economy.starting_money,
            lives: economy.base_health,
            time_scale: self.time_scale,
            ..Self::menu()
        }
    }

    /// Menu state that keeps the host-controlled time scale.
    pub(crate) fn reset(&self) -> Self {
        Self {
            time_scale: self.time_scale,
            ..Self::menu()
        }
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.phase == SessionPhase::Playing
    }

    pub(crate) fn stats(&self, total_waves: usize) -> SessionStats {
        SessionStats {
            money: self.money,
            lives: self.lives,
            wave: self.waves_started,
            total_waves: u32::try_from(total_waves).unwrap_or(u32::MAX),
        }
    }

    /// Deducts `amount` when affordable.
    pub(crate) fn spend(&mut self, amount: u32) -> bool {
        match self.money.checked_sub(amount) {
            Some(remaining) => {
                self.money = remaining;
                true
            }
            None => false,
        }
    }

    pub(crate) fn credit(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }

    pub(crate) fn lose_lives(&mut self, damage: u32) {
        let damage = i32::try_from(damage).unwrap_or(i32::MAX);
        self.lives = self.lives.saturating_sub(damage);
    }

    /// Applies a requested time scale; returns the stored factor when accepted.
    pub(crate) fn set_time_scale(&mut self, factor: f32) -> Option<f32> {
        if !factor.is_finite() || factor < 0.0 {
            return None;
        }
        self.time_scale = factor.min(MAX_TIME_SCALE);
        Some(self.time_scale)
    }

    /// Scales a clamped host delta by the session time scale.
    pub(crate) fn scale(&self, dt: Duration) -> Duration {
        if self.time_scale == 1.0 {
            dt
        } else {
            dt.mul_f64(f64::from(self.time_scale))
        }
    }

    pub(crate) fn activate_ability(&mut self, now: Duration) -> bool {
        if !self.is_playing() || self.ability_expires_at.is_some() {
            return false;
        }
        self.ability_expires_at = Some(now.saturating_add(HERO_ABILITY_DURATION));
        true
    }

    /// Clears the ability once `now` reaches its expiry; reports the transition.
    pub(crate) fn expire_ability(&mut self, now: Duration) -> bool {
        match self.ability_expires_at {
            Some(expires_at) if now >= expires_at => {
                self.ability_expires_at = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn active_ability(&self) -> Option<HeroAbility> {
        self.ability_expires_at.map(|_| self.hero.ability())
    }

    pub(crate) fn ability_remaining(&self, now: Duration) -> Option<Duration> {
        self.ability_expires_at
            .map(|expires_at| expires_at.saturating_sub(now))
    }

    pub(crate) fn damage_multiplier(&self) -> f32 {
        self.active_ability()
            .map_or(1.0, HeroAbility::damage_multiplier)
    }

    pub(crate) fn speed_multiplier(&self) -> f32 {
        self.active_ability()
            .map_or(1.0, HeroAbility::speed_multiplier)
    }
}
