//! Classes shipped with the framework.

use std::collections::VecDeque;

use crate::capability::{Facets, RenderCapable, Renderer, ScriptEntity, TickCapable};
use crate::class_space::ClassRegistry;

/// Class name of [`FpsCounter`].
pub const FPS_COUNTER_CLASS: &str = "org.porcupine.examples.FPSCounter";

/// Ticks averaged by [`FpsCounter`].
pub const FPS_SAMPLES: usize = 100;

/// Example module: tick rate averaged over the last [`FPS_SAMPLES`] ticks.
#[derive(Debug, Clone, Default)]
pub struct FpsCounter {
    samples: VecDeque<f64>,
    tick_rate: u32,
}

impl FpsCounter {
    /// Create a counter with no samples.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticks per second, averaged.
    pub fn tick_rate(&self) -> u32 {
        self.tick_rate
    }

    /// Text drawn by the render hook.
    pub fn label(&self) -> String {
        format!("Tick FPS: {}", self.tick_rate)
    }
}

impl ScriptEntity for FpsCounter {
    fn on_initialize_early(&mut self) {
        self.samples.clear();
        self.tick_rate = 0;
    }
}

impl TickCapable for FpsCounter {
    fn on_tick(&mut self, delta_seconds: f64) {
        if self.samples.len() >= FPS_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(delta_seconds);

        let average = self.samples.iter().sum::<f64>() / self.samples.len() as f64;
        self.tick_rate = if average > 0.0 {
            (1.0 / average) as u32
        } else {
            0
        };
    }
}

impl RenderCapable for FpsCounter {
    fn on_render(&mut self, renderer: &mut dyn Renderer, _delta_seconds: f64) {
        renderer.draw_text(25, 125, &self.label());
    }
}

/// Registry holding the framework's own classes.
pub fn builtin_classes() -> ClassRegistry {
    let mut registry = ClassRegistry::new();
    registry.register_module(FPS_COUNTER_CLASS, |_| {
        Ok(Facets::new(FpsCounter::new())
            .entity()
            .tickable()
            .renderable()
            .build())
    });
    registry
}
