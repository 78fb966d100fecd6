//! Trail configuration (parsed from TOML) and validation
//!
//! Every tunable of an effect lives here. Configuration is static: it is
//! validated once when an emitter is built and never changes afterwards.

use crate::palette::{kculture_bands, AppearanceSource, HueBand};
use crate::simulation::MotionModel;
use crate::spawn::SpawnStrategy;
use mousei_core::{Color, MouseiError, Result};
use mousei_runtime::CoordinateSpace;

/// Blend mode for particle rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Source-over
    Normal,
    /// Additive: overlapping particles brighten instead of occluding
    Lighter,
}

/// Perspective camera looking down -z at the spawn plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    /// Distance from the camera to the z = 0 plane
    pub distance: f32,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 8.0,
            fov_degrees: 60.0,
        }
    }
}

/// Full configuration of one trail effect
#[derive(Debug, Clone, PartialEq)]
pub struct TrailConfig {
    /// Alpha of the background overlay painted each frame; lower leaves longer trails
    pub fade_opacity: f32,
    /// Maximum live particles; allocation past this evicts the oldest
    pub max_particles: usize,
    /// Movement → particle count rule
    pub spawn: SpawnStrategy,
    /// Random offset applied on each axis at spawn, in renderer units
    pub spawn_jitter: f32,
    pub size_min: f32,
    pub size_max: f32,
    /// Base alpha range; drawn alpha is `life × opacity`
    pub opacity_min: f32,
    pub opacity_max: f32,
    /// Glow radius in pixels around each petal; 0 disables the glow
    pub glow_blur: f32,
    /// Spiral speed range
    pub speed_min: f32,
    pub speed_max: f32,
    /// Life lost per frame, sampled per particle (spiral)
    pub decay_min: f32,
    pub decay_max: f32,
    /// Seconds a particle lives (drift)
    pub lifetime_min: f32,
    pub lifetime_max: f32,
    /// Maximum drift per frame on each axis (drift)
    pub drift_speed: f32,
    /// Spawn depth range (drift)
    pub depth_min: f32,
    pub depth_max: f32,
    pub motion: MotionModel,
    /// When set, simulation uses this step instead of the host's frame delta
    pub fixed_dt: Option<f32>,
    pub appearance: AppearanceSource,
    pub blend: BlendMode,
    /// Color of the trail overlay
    pub background: Color,
    /// Draw a small white dot under the pointer while it hovers
    pub cursor_dot: bool,
    /// Space pointer coordinates are normalized into
    pub coordinate_space: CoordinateSpace,
    /// Perspective camera for world-space effects; `None` draws in pixels
    pub camera: Option<CameraConfig>,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self::petal()
    }
}

impl TrailConfig {
    /// 2D canvas petals in the K-culture palette
    pub fn petal() -> Self {
        Self {
            fade_opacity: 0.2,
            max_particles: 150,
            spawn: SpawnStrategy::Interpolated { divisor: 1000.0 },
            spawn_jitter: 0.0,
            size_min: 10.0,
            size_max: 30.0,
            opacity_min: 0.3,
            opacity_max: 0.8,
            glow_blur: 65.0,
            speed_min: 0.2,
            speed_max: 0.5,
            decay_min: 0.0001,
            decay_max: 0.003,
            lifetime_min: 1.5,
            lifetime_max: 4.0,
            drift_speed: 0.0,
            depth_min: 0.0,
            depth_max: 0.0,
            motion: MotionModel::spiral(),
            fixed_dt: None,
            appearance: AppearanceSource::Palette(kculture_bands()),
            blend: BlendMode::Lighter,
            background: Color::from_hex(0x0F0F12),
            cursor_dot: true,
            coordinate_space: CoordinateSpace::Pixels,
            camera: None,
        }
    }

    /// 3D instanced icon sprites drifting away from the pointer
    pub fn galaxy() -> Self {
        Self {
            fade_opacity: 1.0,
            max_particles: 300,
            spawn: SpawnStrategy::Gated {
                min_threshold: 0.002,
                batch_size: 2,
            },
            spawn_jitter: 0.3,
            size_min: 0.5,
            size_max: 2.0,
            opacity_min: 1.0,
            opacity_max: 1.0,
            glow_blur: 0.0,
            speed_min: 0.0,
            speed_max: 0.0,
            decay_min: 0.0,
            decay_max: 0.0,
            lifetime_min: 1.5,
            lifetime_max: 4.0,
            drift_speed: 0.01,
            depth_min: 1.0,
            depth_max: 2.0,
            motion: MotionModel::drift(),
            fixed_dt: Some(0.016),
            appearance: AppearanceSource::Textures { count: 9 },
            blend: BlendMode::Normal,
            background: Color::from_hex(0x3D3D3D),
            cursor_dot: false,
            coordinate_space: CoordinateSpace::Normalized,
            camera: Some(CameraConfig::default()),
        }
    }

    /// Parse a config from TOML source and validate it
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let table: toml::value::Table = toml::from_str(source)?;
        Self::from_toml(&table)
    }

    /// Parse a config from a TOML table and validate it.
    ///
    /// `preset = "petal" | "galaxy"` picks the defaults that the remaining
    /// keys override.
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let preset = match table.get("preset") {
            Some(v) => Some(toml_str("preset", v)?),
            None => None,
        };
        let mut config = match preset {
            None | Some("petal") => Self::petal(),
            Some("galaxy") => Self::galaxy(),
            Some(other) => return Err(invalid_enum(other, &["petal", "galaxy"])),
        };

        if let Some(v) = table.get("fade_opacity") {
            config.fade_opacity = toml_f32("fade_opacity", v)?;
        }
        if let Some(v) = table.get("max_particles") {
            config.max_particles = toml_int("max_particles", v)?.max(0) as usize;
        }
        if let Some(v) = table.get("spawn_jitter") {
            config.spawn_jitter = toml_f32("spawn_jitter", v)?;
        }
        read_range(table, "size", &mut config.size_min, &mut config.size_max)?;
        read_range(table, "opacity", &mut config.opacity_min, &mut config.opacity_max)?;
        read_range(table, "speed", &mut config.speed_min, &mut config.speed_max)?;
        read_range(table, "decay", &mut config.decay_min, &mut config.decay_max)?;
        read_range(table, "lifetime", &mut config.lifetime_min, &mut config.lifetime_max)?;
        read_range(table, "depth", &mut config.depth_min, &mut config.depth_max)?;
        if let Some(v) = table.get("glow_blur") {
            config.glow_blur = toml_f32("glow_blur", v)?;
        }
        if let Some(v) = table.get("drift_speed") {
            config.drift_speed = toml_f32("drift_speed", v)?;
        }
        if let Some(v) = table.get("fixed_dt") {
            config.fixed_dt = match v {
                toml::Value::Boolean(false) => None,
                other => Some(toml_f32("fixed_dt", other)?),
            };
        }
        if let Some(v) = table.get("blend") {
            config.blend = match toml_str("blend", v)? {
                "normal" => BlendMode::Normal,
                "lighter" | "additive" => BlendMode::Lighter,
                other => return Err(invalid_enum(other, &["normal", "lighter"])),
            };
        }
        if let Some(v) = table.get("background") {
            config.background = toml_color(v)?;
        }
        if let Some(v) = table.get("cursor_dot") {
            config.cursor_dot = toml_bool("cursor_dot", v)?;
        }
        if let Some(v) = table.get("coordinate_space") {
            config.coordinate_space = match toml_str("coordinate_space", v)? {
                "pixels" => CoordinateSpace::Pixels,
                "normalized" => CoordinateSpace::Normalized,
                other => return Err(invalid_enum(other, &["pixels", "normalized"])),
            };
        }

        if let Some(v) = table.get("spawn") {
            let spawn = toml_table("spawn", v)?;
            config.spawn = parse_spawn(spawn, config.spawn)?;
            if let Some(v) = spawn.get("jitter") {
                config.spawn_jitter = toml_f32("spawn.jitter", v)?;
            }
        }
        if let Some(v) = table.get("motion") {
            config.motion = parse_motion(toml_table("motion", v)?, config.motion)?;
        }
        if let Some(camera) = table.get("camera") {
            config.camera = match camera {
                toml::Value::Boolean(false) => None,
                toml::Value::Table(t) => {
                    let mut c = config.camera.unwrap_or_default();
                    if let Some(v) = t.get("distance") {
                        c.distance = toml_f32("camera.distance", v)?;
                    }
                    if let Some(v) = t.get("fov_degrees") {
                        c.fov_degrees = toml_f32("camera.fov_degrees", v)?;
                    }
                    Some(c)
                }
                other => return Err(type_mismatch("camera", "a table or false", other)),
            };
        }
        if let Some(v) = table.get("appearance") {
            let appearance = toml_table("appearance", v)?;
            config.appearance = parse_appearance(appearance, &config.appearance)?;
        }
        // Shorthand for `[appearance] kind = "textures"`
        if let Some(v) = table.get("texture_count") {
            config.appearance = AppearanceSource::Textures {
                count: toml_int("texture_count", v)?.clamp(0, u16::MAX as i64) as u16,
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Check every invariant the simulation relies on
    pub fn validate(&self) -> Result<()> {
        if self.max_particles == 0 {
            return Err(MouseiError::not_positive("max_particles", 0.0));
        }
        check_unit("fade_opacity", self.fade_opacity)?;
        check_non_negative("spawn_jitter", self.spawn_jitter)?;
        check_non_negative("glow_blur", self.glow_blur)?;
        check_non_negative("drift_speed", self.drift_speed)?;

        check_range("size", self.size_min, self.size_max)?;
        check_non_negative("size_min", self.size_min)?;
        check_range("opacity", self.opacity_min, self.opacity_max)?;
        check_unit("opacity_min", self.opacity_min)?;
        check_unit("opacity_max", self.opacity_max)?;
        check_range("speed", self.speed_min, self.speed_max)?;
        check_range("decay", self.decay_min, self.decay_max)?;
        check_range("lifetime", self.lifetime_min, self.lifetime_max)?;
        check_range("depth", self.depth_min, self.depth_max)?;

        match self.spawn {
            SpawnStrategy::Interpolated { divisor } => check_positive("spawn.divisor", divisor)?,
            SpawnStrategy::Gated {
                min_threshold,
                batch_size,
            } => {
                check_non_negative("spawn.min_threshold", min_threshold)?;
                check_positive("spawn.batch_size", batch_size as f32)?;
            }
        }

        match self.motion {
            MotionModel::Spiral {
                rotation_rate,
                spread_multiplier,
                shrink_factor,
                visibility_epsilon,
            } => {
                if !rotation_rate.is_finite() || !spread_multiplier.is_finite() {
                    return Err(MouseiError::ConfigError(
                        "motion.rotation_rate and motion.spread_multiplier must be finite".into(),
                    ));
                }
                check_positive("decay_min", self.decay_min)?;
                if !(shrink_factor > 0.0 && shrink_factor <= 1.0) {
                    return Err(MouseiError::ValueOutOfRange {
                        field: "motion.shrink_factor".into(),
                        min: 0.0,
                        max: 1.0,
                        value: shrink_factor as f64,
                    });
                }
                check_non_negative("motion.visibility_epsilon", visibility_epsilon)?;
            }
            MotionModel::Drift { spin_rate } => {
                if !spin_rate.is_finite() {
                    return Err(MouseiError::ConfigError("motion.spin_rate must be finite".into()));
                }
                check_positive("lifetime_min", self.lifetime_min)?;
            }
        }

        if let Some(dt) = self.fixed_dt {
            check_positive("fixed_dt", dt)?;
        }

        match &self.appearance {
            AppearanceSource::Palette(bands) => {
                if bands.is_empty() {
                    return Err(MouseiError::ConfigError(
                        "appearance palette needs at least one band".into(),
                    ));
                }
                for band in bands {
                    check_positive("appearance.bands.weight", band.weight)?;
                    check_range("appearance.bands.hue", band.hue_min, band.hue_max)?;
                    check_unit("appearance.bands.saturation", band.saturation)?;
                    check_unit("appearance.bands.lightness", band.lightness)?;
                }
            }
            AppearanceSource::Textures { count } => {
                check_positive("appearance.count", *count as f32)?;
            }
        }

        match (self.coordinate_space, self.camera) {
            (CoordinateSpace::Pixels, Some(_)) => {
                return Err(MouseiError::ConfigError(
                    "a camera needs coordinate_space = \"normalized\"".into(),
                ));
            }
            (CoordinateSpace::Normalized, None) => {
                return Err(MouseiError::ConfigError(
                    "normalized coordinates need a camera to project them".into(),
                ));
            }
            _ => {}
        }

        if let Some(camera) = self.camera {
            check_positive("camera.distance", camera.distance)?;
            if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
                return Err(MouseiError::ValueOutOfRange {
                    field: "camera.fov_degrees".into(),
                    min: 0.0,
                    max: 180.0,
                    value: camera.fov_degrees as f64,
                });
            }
        }

        Ok(())
    }
}

fn parse_spawn(table: &toml::value::Table, current: SpawnStrategy) -> Result<SpawnStrategy> {
    let strategy = match table.get("strategy") {
        Some(v) => Some(toml_str("spawn.strategy", v)?),
        None => None,
    };
    let mut spawn = match (strategy, current) {
        (None, current) => current,
        (Some("interpolated"), s @ SpawnStrategy::Interpolated { .. }) => s,
        (Some("interpolated"), _) => SpawnStrategy::Interpolated { divisor: 1000.0 },
        (Some("gated"), s @ SpawnStrategy::Gated { .. }) => s,
        (Some("gated"), _) => SpawnStrategy::Gated {
            min_threshold: 0.002,
            batch_size: 2,
        },
        (Some(other), _) => return Err(invalid_enum(other, &["interpolated", "gated"])),
    };

    match &mut spawn {
        SpawnStrategy::Interpolated { divisor } => {
            if let Some(v) = table.get("divisor") {
                *divisor = toml_f32("spawn.divisor", v)?;
            }
        }
        SpawnStrategy::Gated {
            min_threshold,
            batch_size,
        } => {
            if let Some(v) = table.get("min_threshold") {
                *min_threshold = toml_f32("spawn.min_threshold", v)?;
            }
            if let Some(v) = table.get("batch_size") {
                *batch_size = toml_int("spawn.batch_size", v)?.clamp(0, u32::MAX as i64) as u32;
            }
        }
    }
    Ok(spawn)
}

fn parse_motion(table: &toml::value::Table, current: MotionModel) -> Result<MotionModel> {
    let model = match table.get("model") {
        Some(v) => Some(toml_str("motion.model", v)?),
        None => None,
    };
    let mut motion = match (model, current) {
        (None, current) => current,
        (Some("spiral"), m @ MotionModel::Spiral { .. }) => m,
        (Some("spiral"), _) => MotionModel::spiral(),
        (Some("drift"), m @ MotionModel::Drift { .. }) => m,
        (Some("drift"), _) => MotionModel::drift(),
        (Some(other), _) => return Err(invalid_enum(other, &["spiral", "drift"])),
    };

    match &mut motion {
        MotionModel::Spiral {
            rotation_rate,
            spread_multiplier,
            shrink_factor,
            visibility_epsilon,
        } => {
            if let Some(v) = table.get("rotation_rate") {
                *rotation_rate = toml_f32("motion.rotation_rate", v)?;
            }
            if let Some(v) = table.get("spread_multiplier") {
                *spread_multiplier = toml_f32("motion.spread_multiplier", v)?;
            }
            if let Some(v) = table.get("shrink_factor") {
                *shrink_factor = toml_f32("motion.shrink_factor", v)?;
            }
            if let Some(v) = table.get("visibility_epsilon") {
                *visibility_epsilon = toml_f32("motion.visibility_epsilon", v)?;
            }
        }
        MotionModel::Drift { spin_rate } => {
            if let Some(v) = table.get("spin_rate") {
                *spin_rate = toml_f32("motion.spin_rate", v)?;
            }
        }
    }
    Ok(motion)
}

fn parse_appearance(
    table: &toml::value::Table,
    current: &AppearanceSource,
) -> Result<AppearanceSource> {
    let kind = match table.get("kind") {
        Some(v) => Some(toml_str("appearance.kind", v)?),
        None => None,
    };
    match kind {
        Some("textures") => {
            let count = match table.get("count") {
                Some(v) => toml_int("appearance.count", v)?.clamp(0, u16::MAX as i64) as u16,
                None => 9,
            };
            Ok(AppearanceSource::Textures { count })
        }
        Some("palette") | None => {
            let Some(bands) = table.get("bands") else {
                return Ok(match current {
                    AppearanceSource::Palette(_) => current.clone(),
                    AppearanceSource::Textures { .. } => {
                        AppearanceSource::Palette(kculture_bands())
                    }
                });
            };
            let toml::Value::Array(bands) = bands else {
                return Err(type_mismatch("appearance.bands", "an array of tables", bands));
            };
            bands
                .iter()
                .map(|b| parse_band(toml_table("appearance.bands", b)?))
                .collect::<Result<Vec<_>>>()
                .map(AppearanceSource::Palette)
        }
        Some(other) => Err(invalid_enum(other, &["palette", "textures"])),
    }
}

fn parse_band(table: &toml::value::Table) -> Result<HueBand> {
    let mut band = HueBand::new(1.0, 0.0, 0.0);
    if let Some(v) = table.get("weight") {
        band.weight = toml_f32("appearance.bands.weight", v)?;
    }
    if let Some(v) = table.get("hue_min") {
        band.hue_min = toml_f32("appearance.bands.hue_min", v)?;
    }
    if let Some(v) = table.get("hue_max") {
        band.hue_max = toml_f32("appearance.bands.hue_max", v)?;
    }
    if let Some(v) = table.get("saturation") {
        band.saturation = toml_f32("appearance.bands.saturation", v)?;
    }
    if let Some(v) = table.get("lightness") {
        band.lightness = toml_f32("appearance.bands.lightness", v)?;
    }
    Ok(band)
}

// ── Validation helpers ──

fn check_range(field: &str, min: f32, max: f32) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(MouseiError::InvalidRange {
            field: field.to_string(),
            min: min as f64,
            max: max as f64,
        });
    }
    Ok(())
}

fn check_unit(field: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(MouseiError::ValueOutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: 1.0,
            value: value as f64,
        });
    }
    Ok(())
}

fn check_positive(field: &str, value: f32) -> Result<()> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(MouseiError::not_positive(field, value as f64));
    }
    Ok(())
}

fn check_non_negative(field: &str, value: f32) -> Result<()> {
    if !(value >= 0.0 && value.is_finite()) {
        return Err(MouseiError::ValueOutOfRange {
            field: field.to_string(),
            min: 0.0,
            max: f64::MAX,
            value: value as f64,
        });
    }
    Ok(())
}

fn invalid_enum(value: &str, allowed: &[&str]) -> MouseiError {
    MouseiError::InvalidEnumValue {
        value: value.to_string(),
        allowed: allowed.iter().map(|s| s.to_string()).collect(),
    }
}

// ── TOML helpers (integers coerce to floats; any other type is an error) ──

fn type_mismatch(field: &str, expected: &str, v: &toml::Value) -> MouseiError {
    MouseiError::ConfigError(format!("{field} must be {expected}, found {}", v.type_str()))
}

fn toml_f32(field: &str, v: &toml::Value) -> Result<f32> {
    match v {
        toml::Value::Float(f) => Ok(*f as f32),
        toml::Value::Integer(i) => Ok(*i as f32),
        other => Err(type_mismatch(field, "a number", other)),
    }
}

fn toml_int(field: &str, v: &toml::Value) -> Result<i64> {
    v.as_integer().ok_or_else(|| type_mismatch(field, "an integer", v))
}

fn toml_bool(field: &str, v: &toml::Value) -> Result<bool> {
    v.as_bool().ok_or_else(|| type_mismatch(field, "a boolean", v))
}

fn toml_str<'a>(field: &str, v: &'a toml::Value) -> Result<&'a str> {
    v.as_str().ok_or_else(|| type_mismatch(field, "a string", v))
}

fn toml_table<'a>(field: &str, v: &'a toml::Value) -> Result<&'a toml::value::Table> {
    v.as_table().ok_or_else(|| type_mismatch(field, "a table", v))
}

/// Reads `<name>_min` / `<name>_max`
fn read_range(table: &toml::value::Table, name: &str, min: &mut f32, max: &mut f32) -> Result<()> {
    let min_key = format!("{name}_min");
    if let Some(v) = table.get(&min_key) {
        *min = toml_f32(&min_key, v)?;
    }
    let max_key = format!("{name}_max");
    if let Some(v) = table.get(&max_key) {
        *max = toml_f32(&max_key, v)?;
    }
    Ok(())
}

/// Accepts `"#rrggbb"` or `[r, g, b]` / `[r, g, b, a]` in [0, 1]
fn toml_color(v: &toml::Value) -> Result<Color> {
    match v {
        toml::Value::String(s) => {
            let hex = s.trim_start_matches('#');
            u32::from_str_radix(hex, 16)
                .ok()
                .filter(|_| hex.len() == 6)
                .map(Color::from_hex)
                .ok_or_else(|| MouseiError::ConfigError(format!("invalid color \"{s}\"")))
        }
        toml::Value::Array(arr) if (3..=4).contains(&arr.len()) => {
            let alpha = match arr.get(3) {
                Some(a) => toml_f32("background", a)?,
                None => 1.0,
            };
            Ok(Color::new(
                toml_f32("background", &arr[0])?,
                toml_f32("background", &arr[1])?,
                toml_f32("background", &arr[2])?,
                alpha,
            ))
        }
        _ => Err(MouseiError::ConfigError(
            "background must be \"#rrggbb\" or an [r, g, b] array".into(),
        )),
    }
}
