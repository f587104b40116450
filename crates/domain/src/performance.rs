//! Frame-rate sampling and quality tier selection
//!
//! `PerformanceMonitor::tick` is called once per rendered frame with a
//! monotonic timestamp. Once per sample interval it produces a
//! [`PerformanceSample`] from the frames counted since the last sample.
//! A tier change only takes effect after the candidate tier has been seen
//! on `confirm_samples` consecutive samples.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::value_objects::{QualityTier, TierThresholds};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PerformanceConfig {
    pub sample_interval_ms: f64,
    pub window: usize,
    pub thresholds: TierThresholds,
    pub confirm_samples: usize,
    pub auto_adjust: bool,
    pub initial_tier: QualityTier,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: 1000.0,
            window: 10,
            thresholds: TierThresholds::default(),
            confirm_samples: 3,
            auto_adjust: true,
            initial_tier: QualityTier::High,
        }
    }
}

impl PerformanceConfig {
    pub fn clamped(&self) -> Self {
        Self {
            sample_interval_ms: if self.sample_interval_ms.is_finite() {
                self.sample_interval_ms.max(16.0)
            } else {
                1000.0
            },
            window: self.window.max(1),
            thresholds: self.thresholds.normalized(),
            confirm_samples: self.confirm_samples.max(1),
            ..*self
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSample {
    pub fps: f32,
    pub average_fps: f32,
    pub frame_time_ms: f32,
    pub variance: f32,
    pub is_stable: bool,
    pub tier: QualityTier,
    pub tier_changed: bool,
}

#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    config: PerformanceConfig,
    tier: QualityTier,
    history: VecDeque<f32>,
    frames: u32,
    window_start: Option<f64>,
    candidate: Option<(QualityTier, usize)>,
    last: Option<PerformanceSample>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(PerformanceConfig::default())
    }
}

impl PerformanceMonitor {
    pub fn new(config: PerformanceConfig) -> Self {
        let config = config.clamped();
        Self {
            tier: config.initial_tier,
            history: VecDeque::with_capacity(config.window),
            frames: 0,
            window_start: None,
            candidate: None,
            last: None,
            config,
        }
    }

    pub fn tier(&self) -> QualityTier {
        self.tier
    }

    pub fn last_sample(&self) -> Option<&PerformanceSample> {
        self.last.as_ref()
    }

    pub fn config(&self) -> &PerformanceConfig {
        &self.config
    }

    /// Manual override. Also resets any pending candidate.
    pub fn set_tier(&mut self, tier: QualityTier) {
        self.tier = tier;
        self.candidate = None;
    }

    pub fn set_auto_adjust(&mut self, enabled: bool) {
        self.config.auto_adjust = enabled;
        self.candidate = None;
    }

    /// Counts one frame. Returns a sample whenever the interval elapses.
    pub fn tick(&mut self, now_ms: f64) -> Option<PerformanceSample> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now_ms);
            return None;
        };
        self.frames += 1;

        let elapsed = now_ms - start;
        if elapsed < self.config.sample_interval_ms {
            return None;
        }

        let fps = (f64::from(self.frames) * 1000.0 / elapsed).round() as f32;
        self.frames = 0;
        self.window_start = Some(now_ms);

        Some(self.record(fps))
    }

    /// Feeds a precomputed fps reading, bypassing frame counting.
    pub fn record(&mut self, fps: f32) -> PerformanceSample {
        let fps = if fps.is_finite() { fps.max(0.0) } else { 0.0 };
        self.history.push_back(fps);
        while self.history.len() > self.config.window {
            self.history.pop_front();
        }

        let n = self.history.len() as f32;
        let average = self.history.iter().sum::<f32>() / n;
        let variance = self
            .history
            .iter()
            .map(|v| (v - average).powi(2))
            .sum::<f32>()
            / n;

        let tier_changed = self.config.auto_adjust && self.consider(average);
        let sample = PerformanceSample {
            fps,
            average_fps: average,
            frame_time_ms: if fps > 0.0 { 1000.0 / fps } else { 0.0 },
            variance,
            is_stable: variance < 100.0 && fps > 30.0,
            tier: self.tier,
            tier_changed,
        };

        if !sample.is_stable && self.history.len() == self.config.window {
            tracing::debug!(variance, fps, "Unstable frame rate");
        }
        self.last = Some(sample);
        sample
    }

    fn consider(&mut self, average: f32) -> bool {
        let target = QualityTier::from_fps(average, &self.config.thresholds);
        if target == self.tier {
            self.candidate = None;
            return false;
        }

        let seen = match self.candidate {
            Some((tier, count)) if tier == target => count + 1,
            _ => 1,
        };
        if seen < self.config.confirm_samples {
            self.candidate = Some((target, seen));
            return false;
        }

        tracing::info!(from = %self.tier, to = %target, average_fps = average, "Quality tier changed");
        self.tier = target;
        self.candidate = None;
        true
    }
}

/// Coarse hardware description used to pick a starting tier before any
/// frames have been measured.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceCapabilities {
    pub has_webgl: bool,
    pub gpu_renderer: String,
    pub memory_gb: Option<u32>,
    pub cpu_cores: Option<u32>,
}

impl DeviceCapabilities {
    pub fn score(&self) -> u32 {
        let renderer = self.gpu_renderer.to_lowercase();
        let gpu = if renderer.contains("nvidia") || renderer.contains("amd") {
            3
        } else if renderer.contains("intel") {
            1
        } else {
            0
        };
        let memory = match self.memory_gb.unwrap_or(4) {
            m if m >= 8 => 3,
            m if m >= 4 => 2,
            _ => 1,
        };
        let cores = match self.cpu_cores.unwrap_or(4) {
            c if c >= 8 => 3,
            c if c >= 4 => 2,
            _ => 1,
        };
        gpu + memory + cores
    }

    pub fn estimate_tier(&self) -> QualityTier {
        if !self.has_webgl {
            return QualityTier::Low;
        }
        match self.score() {
            s if s >= 8 => QualityTier::Ultra,
            s if s >= 6 => QualityTier::High,
            s if s >= 4 => QualityTier::Medium,
            _ => QualityTier::Low,
        }
    }
}
