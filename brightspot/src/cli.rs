//! Command-line arguments shared by the brightspot binaries.

use crate::core_modules::grid_partitioner::{CellSizePolicy, DEFAULT_REFINEMENT_DIVISOR};
use crate::pipeline::{DEFAULT_BOX_HEIGHT, DEFAULT_BOX_WIDTH, PipelineConfig};
use clap::Args;

/// Grid and overlay settings. Without `--cell-size`, the cell side is
/// `gcd(width, height) / divisor`, derived from the first frame.
#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    /// Fixed cell side in pixels; overrides the gcd-derived size
    #[arg(long, value_name = "PIXELS")]
    pub cell_size: Option<u32>,

    /// Subdivide the gcd cell by this factor (1 = plain gcd grid)
    #[arg(long, value_name = "N", default_value_t = DEFAULT_REFINEMENT_DIVISOR)]
    pub divisor: u32,

    /// Width of the box drawn around the brightest cell
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_BOX_WIDTH)]
    pub box_width: u32,

    /// Height of the box drawn around the brightest cell
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_BOX_HEIGHT)]
    pub box_height: u32,
}

impl SearchArgs {
    pub fn policy(&self) -> CellSizePolicy {
        match self.cell_size {
            Some(side) => CellSizePolicy::Fixed(side),
            None if self.divisor == 1 => CellSizePolicy::Gcd,
            None => CellSizePolicy::Refined {
                divisor: self.divisor,
            },
        }
    }

    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            policy: self.policy(),
            box_width: self.box_width,
            box_height: self.box_height,
            ..PipelineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        search: SearchArgs,
    }

    #[test]
    fn defaults_to_the_refined_policy() {
        let cli = TestCli::parse_from(["test"]);
        let config = cli.search.to_config();
        assert_eq!(config.policy, CellSizePolicy::Refined { divisor: 4 });
        assert_eq!((config.box_width, config.box_height), (50, 50));
    }

    #[test]
    fn divisor_of_one_is_the_plain_gcd_grid() {
        let cli = TestCli::parse_from(["test", "--divisor", "1"]);
        assert_eq!(cli.search.policy(), CellSizePolicy::Gcd);
    }

    #[test]
    fn explicit_cell_size_wins() {
        let cli = TestCli::parse_from(["test", "--cell-size", "16", "--divisor", "2", "--box-width", "20"]);
        assert_eq!(cli.search.policy(), CellSizePolicy::Fixed(16));
        assert_eq!(cli.search.to_config().box_width, 20);
    }
}
