use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::error::{ContourError, Result};

/// How vertices are kept while a closed ring is read back.
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Simplification {
    /// One vertex per unit boundary segment
    None,
    /// Only vertices where the boundary changes direction
    #[default]
    Simple,
    /// Direction changes, then Ramer-Douglas-Peucker with keystones pinned
    Rdp,
}

/// Where integer output coordinates sit relative to a raster cell.
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PixelOrigin {
    /// Cell `(x, y)` spans `[x, x + 1] x [y, y + 1]`
    #[default]
    Corner,
    /// Every output vertex is shifted by half a cell on both axes
    Center,
}

impl PixelOrigin {
    pub fn offset(self) -> f32 {
        match self {
            Self::Corner => 0.0,
            Self::Center => 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ContourParameters {
    pub simplification: Simplification,
    /// Maximum deviation of dropped vertices in `rdp` mode, in output units
    #[schemars(range(min = 0.0))]
    pub rdp_max_error: f32,
    pub pixel_origin: PixelOrigin,
}

impl Default for ContourParameters {
    fn default() -> Self {
        Self {
            simplification: Simplification::default(),
            rdp_max_error: 0.5,
            pixel_origin: PixelOrigin::default(),
        }
    }
}

impl ContourParameters {
    pub fn builder() -> ContourParametersBuilder {
        ContourParametersBuilder::default()
    }

    /// Rejects settings that cannot produce a meaningful trace.
    pub fn validate(&self) -> Result<()> {
        if self.simplification == Simplification::Rdp
            && !(self.rdp_max_error.is_finite() && self.rdp_max_error > 0.0)
        {
            return Err(ContourError::InvalidParameter {
                name: "rdp_max_error",
                reason: format!(
                    "must be a positive finite number with rdp simplification, got {}",
                    self.rdp_max_error
                ),
            });
        }
        Ok(())
    }
}

/// Fluent construction of [`ContourParameters`], validated on `build`.
#[derive(Debug, Clone, Default)]
pub struct ContourParametersBuilder {
    params: ContourParameters,
}

impl ContourParametersBuilder {
    pub fn simplification(mut self, simplification: Simplification) -> Self {
        self.params.simplification = simplification;
        self
    }

    /// Switches to `rdp` simplification with the given tolerance
    pub fn with_rdp(mut self, max_error: f32) -> Self {
        self.params.simplification = Simplification::Rdp;
        self.params.rdp_max_error = max_error;
        self
    }

    pub fn rdp_max_error(mut self, max_error: f32) -> Self {
        self.params.rdp_max_error = max_error;
        self
    }

    pub fn pixel_origin(mut self, origin: PixelOrigin) -> Self {
        self.params.pixel_origin = origin;
        self
    }

    pub fn build(self) -> Result<ContourParameters> {
        self.params.validate()?;
        Ok(self.params)
    }
}
