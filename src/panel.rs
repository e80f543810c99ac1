//! The parameter panel.
//!
//! Controls never mutate state themselves. Each slider that moves produces a
//! [`Command`], and [`AppState::apply`](crate::state::AppState::apply) is the
//! only place commands take effect.

use std::ops::RangeInclusive;

use crate::config::Options;
use crate::state::AppState;
use crate::time::FrameStats;

/// Panel section a control lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Folder {
    Bloom,
    Tree,
}

impl Folder {
    pub const ALL: [Folder; 2] = [Folder::Bloom, Folder::Tree];

    pub fn name(self) -> &'static str {
        match self {
            Folder::Bloom => "bloom",
            Folder::Tree => "tree",
        }
    }
}

/// One slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Exposure,
    BloomThreshold,
    BloomStrength,
    BloomRadius,
    Wraps,
    Pow,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::Exposure,
        Control::BloomThreshold,
        Control::BloomStrength,
        Control::BloomRadius,
        Control::Wraps,
        Control::Pow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Control::Exposure => "exposure",
            Control::BloomThreshold => "bloomThreshold",
            Control::BloomStrength => "bloomStrength",
            Control::BloomRadius => "bloomRadius",
            Control::Wraps => "wraps",
            Control::Pow => "pow",
        }
    }

    pub fn folder(self) -> Folder {
        match self {
            Control::Wraps | Control::Pow => Folder::Tree,
            _ => Folder::Bloom,
        }
    }

    pub fn range(self) -> RangeInclusive<f32> {
        match self {
            Control::Exposure => 0.1..=2.0,
            Control::BloomThreshold => 0.0..=1.0,
            Control::BloomStrength => 0.0..=10.0,
            Control::BloomRadius => 0.0..=1.0,
            Control::Wraps => 0.0..=50.0,
            Control::Pow => 0.0..=5.0,
        }
    }

    /// Whether the control only takes whole numbers.
    pub fn is_integer(self) -> bool {
        matches!(self, Control::Wraps)
    }

    /// Current value of this control in `options`.
    pub fn value(self, options: &Options) -> f32 {
        match self {
            Control::Exposure => options.exposure,
            Control::BloomThreshold => options.bloom_threshold,
            Control::BloomStrength => options.bloom_strength,
            Control::BloomRadius => options.bloom_radius,
            Control::Wraps => options.wraps as f32,
            Control::Pow => options.pow,
        }
    }

    /// Command setting this control to `value`.
    pub fn command(self, value: f32) -> Command {
        match self {
            Control::Exposure => Command::SetExposure(value),
            Control::BloomThreshold => Command::SetBloomThreshold(value),
            Control::BloomStrength => Command::SetBloomStrength(value),
            Control::BloomRadius => Command::SetBloomRadius(value),
            Control::Wraps => Command::SetWraps(value.max(0.0).round() as u32),
            Control::Pow => Command::SetPow(value),
        }
    }
}

/// A parameter change requested by the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    SetExposure(f32),
    SetBloomThreshold(f32),
    SetBloomStrength(f32),
    SetBloomRadius(f32),
    SetWraps(u32),
    SetPow(f32),
}

impl Command {
    /// The control this command belongs to.
    pub fn control(&self) -> Control {
        match self {
            Command::SetExposure(_) => Control::Exposure,
            Command::SetBloomThreshold(_) => Control::BloomThreshold,
            Command::SetBloomStrength(_) => Control::BloomStrength,
            Command::SetBloomRadius(_) => Control::BloomRadius,
            Command::SetWraps(_) => Control::Wraps,
            Command::SetPow(_) => Control::Pow,
        }
    }

    /// The requested value, as the slider shows it.
    pub fn value(&self) -> f32 {
        match *self {
            Command::SetExposure(v)
            | Command::SetBloomThreshold(v)
            | Command::SetBloomStrength(v)
            | Command::SetBloomRadius(v)
            | Command::SetPow(v) => v,
            Command::SetWraps(n) => n as f32,
        }
    }
}

/// Slider window drawn over the render.
#[derive(Debug, Default)]
pub struct ParameterPanel {
    pending: Vec<Command>,
}

impl ParameterPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw the panel for the current state and queue a command for every
    /// slider the user moved.
    pub fn show(&mut self, ctx: &egui::Context, state: &AppState, stats: &FrameStats) {
        let options = state.options();

        egui::Window::new("controls")
            .resizable(false)
            .default_width(260.0)
            .show(ctx, |ui| {
                for folder in Folder::ALL {
                    egui::CollapsingHeader::new(folder.name())
                        .default_open(true)
                        .show(ui, |ui| {
                            for control in Control::ALL.into_iter().filter(|c| c.folder() == folder) {
                                if let Some(command) = slider(ui, control, options) {
                                    self.pending.push(command);
                                }
                            }
                        });
                }

                ui.separator();
                ui.label(format!(
                    "{:.0} fps  |  frame {}  |  {} particles",
                    stats.fps(),
                    stats.frame(),
                    state.scene().field().len()
                ));
            });
    }

    /// Commands queued since the last call.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.pending)
    }
}

fn slider(ui: &mut egui::Ui, control: Control, options: &Options) -> Option<Command> {
    let range = control.range();

    if control.is_integer() {
        let mut value = control.value(options) as u32;
        let int_range = *range.start() as u32..=*range.end() as u32;
        let response = ui.add(egui::Slider::new(&mut value, int_range).text(control.name()));
        response.changed().then(|| control.command(value as f32))
    } else {
        let mut value = control.value(options);
        let response = ui.add(egui::Slider::new(&mut value, range).text(control.name()));
        response.changed().then(|| control.command(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn test_control_table() {
        assert_eq!(Control::Exposure.range(), 0.1..=2.0);
        assert_eq!(Control::BloomStrength.range(), 0.0..=10.0);
        assert_eq!(Control::Wraps.range(), 0.0..=50.0);
        assert_eq!(Control::Pow.range(), 0.0..=5.0);

        let bloom: Vec<_> = Control::ALL.iter().filter(|c| c.folder() == Folder::Bloom).collect();
        let tree: Vec<_> = Control::ALL.iter().filter(|c| c.folder() == Folder::Tree).collect();
        assert_eq!(bloom.len(), 4);
        assert_eq!(tree, vec![&Control::Wraps, &Control::Pow]);
    }

    #[test]
    fn test_command_round_trip_per_control() {
        for control in Control::ALL {
            let command = control.command(1.0);
            assert_eq!(command.control(), control);
            assert_eq!(command.value(), 1.0);
        }
    }

    #[test]
    fn test_wraps_command_rounds() {
        assert_eq!(Control::Wraps.command(12.6), Command::SetWraps(13));
        assert_eq!(Control::Wraps.command(-3.0), Command::SetWraps(0));
        assert!(Control::Wraps.is_integer());
        assert!(!Control::Pow.is_integer());
    }

    #[test]
    fn test_value_reads_options() {
        let options = Options {
            wraps: 7,
            ..Options::default()
        };
        assert_eq!(Control::Wraps.value(&options), 7.0);
        assert_eq!(Control::BloomStrength.value(&options), 8.0);
    }

    #[test]
    fn test_show_without_input_queues_nothing() {
        let state = AppState::new(&AppConfig::new().with_seed(1), 800, 600);
        let stats = FrameStats::new();
        let mut panel = ParameterPanel::new();
        let ctx = egui::Context::default();

        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            panel.show(ctx, &state, &stats);
        });

        assert!(panel.take_commands().is_empty());
    }
}
