//! Headless frame loop.

use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rive_core::{LoadingStatus, Player, PointerEvent, PointerEventKind};
use rive_renderer::{OpenGlDrawList, PainterRenderer, RenderType, RendererFactory};

use crate::ViewerConfig;

/// Where frames are drawn.
enum FrameSink {
    Painter(PainterRenderer),
    OpenGl(OpenGlDrawList),
    /// GPU meshes are built by the factory; there is no headless presenter.
    Gpu,
}

/// Summary of a finished run.
#[derive(Debug, Clone)]
pub struct FrameReport {
    /// Frames advanced.
    pub frames: u32,
    /// Whether the driver still wanted frames after the last one.
    pub still_animating: bool,
    /// Draw commands recorded in the last frame, for recording backends.
    pub draw_commands: Option<usize>,
    /// Published state machine inputs after the run.
    pub inputs: serde_json::Value,
}

/// Viewer application.
///
/// Owns the renderer factory, the player and the frame sink.
pub struct ViewerApp {
    config: ViewerConfig,
    factory: Rc<RendererFactory>,
    player: Player,
    sink: FrameSink,
}

impl ViewerApp {
    /// Create the viewer for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the painter target cannot be created.
    pub fn new(config: ViewerConfig) -> Result<Self> {
        let factory = Rc::new(RendererFactory::new(config.backend));
        let sink = match config.backend {
            RenderType::None | RenderType::Painter => FrameSink::Painter(
                PainterRenderer::new(config.width, config.height)
                    .context("Failed to create painter target")?,
            ),
            RenderType::OpenGl => FrameSink::OpenGl(OpenGlDrawList::new()),
            RenderType::Gpu => FrameSink::Gpu,
        };
        let player = Player::with_config(factory.clone(), config.player.clone());
        tracing::debug!("Viewer created with {} backend", factory.render_type());
        Ok(Self {
            config,
            factory,
            player,
            sink,
        })
    }

    /// The player.
    #[must_use]
    pub fn player(&self) -> &Player {
        &self.player
    }

    /// The renderer factory.
    #[must_use]
    pub fn factory(&self) -> &RendererFactory {
        &self.factory
    }

    /// Load the configured document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or parsed.
    pub fn load(&mut self) -> Result<()> {
        self.player.set_file_source(&self.config.file);
        for event in self.player.drain_events() {
            tracing::debug!("Player event: {event:?}");
        }
        if self.player.status() != LoadingStatus::Loaded {
            bail!("Failed to load {}", self.config.file.display());
        }

        let artboard = self
            .player
            .current_artboard_index()
            .and_then(|i| self.player.artboards().get(i))
            .map_or("<none>", |info| info.name.as_str());
        let state_machine = self
            .player
            .current_state_machine_index()
            .and_then(|i| self.player.state_machines().get(i))
            .map_or("<none>", |info| info.name.as_str());
        tracing::info!(
            "Loaded {}: artboard '{artboard}', state machine '{state_machine}'",
            self.config.file.display()
        );
        Ok(())
    }

    /// Route the configured input writes, trigger fires and clicks.
    pub fn apply_inputs(&mut self) {
        for (name, value) in &self.config.inputs {
            tracing::debug!("Setting input '{name}' to {value}");
            self.player.set_input(name, value.clone());
        }
        for name in &self.config.triggers {
            tracing::debug!("Firing trigger '{name}'");
            self.player.activate_trigger(name);
        }
        for &(x, y) in &self.config.clicks {
            let down = self.player.dispatch(PointerEvent::new(PointerEventKind::Down, x, y));
            let up = self.player.dispatch(PointerEvent::new(PointerEventKind::Up, x, y));
            tracing::debug!("Click at ({x}, {y}) hit: {}", down || up);
        }
    }

    /// Advance and draw the configured number of frames.
    pub fn run(&mut self) -> FrameReport {
        let step = Duration::from_secs_f64(1.0 / f64::from(self.config.fps));
        let mut still_animating = false;
        let mut draw_commands = None;
        for frame in 0..self.config.frames {
            still_animating = self.player.advance(step);
            draw_commands = self.render_frame();
            tracing::trace!("Frame {frame} done, animating: {still_animating}");
        }
        let inputs = self.player.input_map().to_json();
        tracing::info!(
            "Ran {} frames at {} fps; inputs: {inputs}",
            self.config.frames,
            self.config.fps
        );
        FrameReport {
            frames: self.config.frames,
            still_animating,
            draw_commands,
            inputs,
        }
    }

    /// Draw the current state into the sink.
    ///
    /// Returns the number of recorded commands for recording backends.
    pub fn render_frame(&mut self) -> Option<usize> {
        match &mut self.sink {
            FrameSink::Painter(renderer) => {
                renderer.clear(0);
                self.player.draw(renderer);
                None
            }
            FrameSink::OpenGl(list) => {
                list.clear();
                self.player.draw(list);
                Some(list.commands().len())
            }
            FrameSink::Gpu => None,
        }
    }

    /// Write the last painter frame to the configured output, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails, or if an output was
    /// requested for a backend that does not produce pixels.
    pub fn write_output(&self) -> Result<()> {
        let Some(path) = &self.config.output else {
            return Ok(());
        };
        let FrameSink::Painter(renderer) = &self.sink else {
            bail!(
                "PNG output needs the painter backend, not {}",
                self.factory.render_type()
            );
        };
        let png = renderer.encode_png()?;
        std::fs::write(path, png)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Wrote {}", path.display());
        Ok(())
    }
}
