//! Parameter metadata and index-based introspection.
//!
//! Every tweakable value in the engine is described by a [`ParamDescriptor`]:
//! display names, unit, range, default and a stable [`ParamId`]. Containers of
//! parameter values implement [`ParameterInfo`] so that control surfaces,
//! patch files and automation can address them uniformly by index.
//!
//! # Example
//!
//! ```rust
//! use vintage_core::{ParameterInfo, ParamDescriptor, ParamId, ParamUnit};
//!
//! struct Level {
//!     gain: f32,
//! }
//!
//! const GAIN: ParamDescriptor =
//!     ParamDescriptor::new("Gain", "Gain", ParamUnit::Percent, 0.0, 100.0, 80.0)
//!         .with_id(ParamId(1), "gain");
//!
//! impl ParameterInfo for Level {
//!     fn param_count(&self) -> usize { 1 }
//!
//!     fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
//!         (index == 0).then_some(GAIN)
//!     }
//!
//!     fn get_param(&self, index: usize) -> f32 {
//!         if index == 0 { self.gain } else { 0.0 }
//!     }
//!
//!     fn set_param(&mut self, index: usize, value: f32) {
//!         if index == 0 {
//!             self.gain = GAIN.clamp(value);
//!         }
//!     }
//! }
//!
//! let mut level = Level { gain: 80.0 };
//! level.set_param(0, 150.0);
//! assert_eq!(level.get_param(0), 100.0);
//! assert_eq!(level.find_param_by_name("gain"), Some(0));
//! ```

/// Mapping between a parameter's plain value and normalized \[0, 1\].
///
/// - **Linear**: `(value - min) / (max - min)`
/// - **Logarithmic**: `ln(value/min) / ln(max/min)`, requires `min > 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamScale {
    /// Equal resolution across the range.
    #[default]
    Linear,
    /// More resolution at low values. Used for frequencies.
    Logarithmic,
}

/// Stable parameter identifier.
///
/// Indices may be reordered between releases; ids may not. Patch files and
/// automation refer to parameters by `string_id`, hosts by this number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamId(pub u32);

/// Parameter capability bits.
///
/// ```rust
/// use vintage_core::ParamFlags;
///
/// let flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
/// assert!(flags.contains(ParamFlags::STEPPED));
/// assert!(!ParamFlags::AUTOMATABLE.contains(ParamFlags::STEPPED));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamFlags(u8);

impl ParamFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Can be automated by a host.
    pub const AUTOMATABLE: Self = Self(1 << 0);
    /// Takes integer values only (counts, choices, toggles).
    pub const STEPPED: Self = Self(1 << 1);

    /// `true` if every bit in `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Union of two flag sets.
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

impl Default for ParamFlags {
    fn default() -> Self {
        Self::AUTOMATABLE
    }
}

/// Display unit of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Seconds, for envelope stage times.
    Seconds,
    /// Hertz, for frequencies.
    Hertz,
    /// Percent (0–100 or ±100).
    Percent,
    /// A whole number of things, e.g. unison voices.
    Count,
    /// Index into a fixed list of named choices.
    Choice,
    /// Off (0) or on (1).
    Toggle,
    /// Dimensionless.
    None,
}

impl ParamUnit {
    /// Suffix appended when displaying a value.
    ///
    /// ```rust
    /// use vintage_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Hertz.suffix(), " Hz");
    /// assert_eq!(ParamUnit::Count.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Seconds => " s",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Percent => "%",
            ParamUnit::Count | ParamUnit::Choice | ParamUnit::Toggle | ParamUnit::None => "",
        }
    }

    /// Short lowercase label, used in listings and JSON output.
    pub const fn label(&self) -> &'static str {
        match self {
            ParamUnit::Seconds => "seconds",
            ParamUnit::Hertz => "hertz",
            ParamUnit::Percent => "percent",
            ParamUnit::Count => "count",
            ParamUnit::Choice => "choice",
            ParamUnit::Toggle => "toggle",
            ParamUnit::None => "none",
        }
    }
}

/// Metadata for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full display name.
    pub name: &'static str,
    /// Name for narrow displays, at most 8 characters.
    pub short_name: &'static str,
    /// Display unit.
    pub unit: ParamUnit,
    /// Lowest accepted value.
    pub min: f32,
    /// Highest accepted value.
    pub max: f32,
    /// Value on initialization.
    pub default: f32,
    /// Suggested increment for encoders and sliders.
    pub step: f32,
    /// Stable numeric id.
    pub id: ParamId,
    /// Stable text id, `snake_case`. Used as the key in patch files.
    pub string_id: &'static str,
    /// Normalization curve.
    pub scale: ParamScale,
    /// Capability flags.
    pub flags: ParamFlags,
    /// Group for tree display, e.g. `"filter"`. Empty means top level.
    pub group: &'static str,
}

impl ParamDescriptor {
    /// Continuous, linear, automatable parameter with step `0.01`.
    pub const fn new(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            name,
            short_name,
            unit,
            min,
            max,
            default,
            step: 0.01,
            id: ParamId(0),
            string_id: "",
            scale: ParamScale::Linear,
            flags: ParamFlags::AUTOMATABLE,
            group: "",
        }
    }

    /// Integer-valued parameter (`step = 1`, [`ParamFlags::STEPPED`]).
    pub const fn stepped(
        name: &'static str,
        short_name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        let mut desc = Self::new(name, short_name, unit, min, max, default);
        desc.step = 1.0;
        desc.flags = ParamFlags::AUTOMATABLE.union(ParamFlags::STEPPED);
        desc
    }

    /// Set the stable ids.
    pub const fn with_id(mut self, id: ParamId, string_id: &'static str) -> Self {
        self.id = id;
        self.string_id = string_id;
        self
    }

    /// Set the normalization curve.
    pub const fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Set the display step.
    pub const fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    /// Set the group.
    pub const fn with_group(mut self, group: &'static str) -> Self {
        self.group = group;
        self
    }

    /// `true` for counts, choices and toggles.
    #[inline]
    pub const fn is_stepped(&self) -> bool {
        self.flags.contains(ParamFlags::STEPPED)
    }

    /// Clamp to `[min, max]`, rounding stepped parameters to the nearest
    /// integer. NaN maps to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            return self.default;
        }
        let v = if self.is_stepped() {
            libm::roundf(value)
        } else {
            value
        };
        if v < self.min {
            self.min
        } else if v > self.max {
            self.max
        } else {
            v
        }
    }

    /// `true` when `value` is within `[min, max]`.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Plain value to \[0, 1\].
    ///
    /// ```rust
    /// use vintage_core::{ParamDescriptor, ParamScale, ParamUnit};
    ///
    /// let cutoff = ParamDescriptor::new("Cutoff", "Cutoff", ParamUnit::Hertz, 20.0, 20000.0, 1000.0)
    ///     .with_scale(ParamScale::Logarithmic);
    /// assert!(cutoff.normalize(20.0).abs() < 1e-6);
    /// assert!((cutoff.normalize(20000.0) - 1.0).abs() < 1e-6);
    /// ```
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        let value = self.clamp(value);
        match self.scale {
            ParamScale::Linear => (value - self.min) / range,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    return (value - self.min) / range;
                }
                libm::logf(value / self.min) / libm::logf(self.max / self.min)
            }
        }
    }

    /// \[0, 1\] to plain value. Inverse of [`normalize`](Self::normalize).
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let n = normalized.clamp(0.0, 1.0);
        let plain = match self.scale {
            ParamScale::Linear => self.min + n * (self.max - self.min),
            ParamScale::Logarithmic if self.min > 0.0 => {
                self.min * libm::powf(self.max / self.min, n)
            }
            ParamScale::Logarithmic => self.min + n * (self.max - self.min),
        };
        self.clamp(plain)
    }
}

/// Index-based access to a set of parameters.
///
/// Indices are `0..param_count()` and stable for the lifetime of the value.
/// Implementations clamp in [`set_param`](Self::set_param) and ignore
/// out-of-range indices; [`get_param`](Self::get_param) returns `0.0` for them.
pub trait ParameterInfo {
    /// Number of parameters.
    fn param_count(&self) -> usize;

    /// Descriptor for `index`, or `None` past the end.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current value of `index`.
    fn get_param(&self, index: usize) -> f32;

    /// Set `index` to `value`, clamped to its range.
    fn set_param(&mut self, index: usize, value: f32);

    /// Look up an index by display name, short name or string id,
    /// ignoring ASCII case.
    fn find_param_by_name(&self, name: &str) -> Option<usize> {
        (0..self.param_count()).find(|&i| {
            self.param_info(i).is_some_and(|d| {
                d.name.eq_ignore_ascii_case(name)
                    || d.short_name.eq_ignore_ascii_case(name)
                    || d.string_id.eq_ignore_ascii_case(name)
            })
        })
    }
}
