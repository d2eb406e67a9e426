use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::mpsc::{self, TryRecvError};
use std::time::{Duration, Instant};

use scanner_core::{update, AppState, Msg, ScannerSettings};
use scanner_engine::{DecodeSource, EngineHandle};
use scanner_logging::{scanner_debug, scanner_info, scanner_warn};

use crate::effects::{map_event, EffectRunner};
use crate::input::Input;
use crate::render::render;

/// Upper bound on how long `:quit` waits for in-flight lookups.
const QUIT_GRACE: Duration = Duration::from_secs(5);
const HELP: &str = "commands: :start :stop :clear :quit";

/// Startup note for codes typed or wedge-scanned into stdin, which arrive
/// once per scan rather than once per camera frame.
fn stdin_hint(threshold: u32, has_decoder: bool) -> Option<String> {
    if has_decoder || threshold <= 1 {
        return None;
    }
    Some(format!(
        "no decoder_input configured: a code typed here is accepted after {threshold} \
         identical lines; set scan.threshold: 1 for keyboard-wedge readers"
    ))
}

pub struct App<W: Write> {
    state: AppState,
    effects: EffectRunner,
    engine: EngineHandle,
    out: W,
    tick: Duration,
    has_decoder: bool,
}

impl<W: Write> App<W> {
    pub fn new(
        settings: ScannerSettings,
        engine: EngineHandle,
        source: Option<Box<dyn DecodeSource>>,
        out: W,
        tick: Duration,
    ) -> Self {
        let has_decoder = source.is_some();
        Self {
            state: AppState::with_settings(settings),
            effects: EffectRunner::new(engine.clone(), source),
            engine,
            out,
            tick,
            has_decoder,
        }
    }

    /// Runs `msg` and every follow-up it produces, then renders once if needed.
    pub fn dispatch(&mut self, msg: Msg) -> io::Result<()> {
        let mut queue = VecDeque::from([msg]);
        let mut needs_render = false;
        while let Some(msg) = queue.pop_front() {
            scanner_debug!("Dispatch {:?}", msg);
            let state = std::mem::take(&mut self.state);
            let (mut state, effects) = update(state, msg);
            needs_render |= state.consume_dirty();
            self.state = state;
            queue.extend(self.effects.run(effects));
        }
        if needs_render {
            self.render()?;
        }
        Ok(())
    }

    /// Waits up to `wait` for engine events and dispatches all that arrived.
    /// Returns whether any event was handled.
    pub fn pump_engine(&mut self, wait: Duration) -> io::Result<bool> {
        let Some(first) = self.engine.recv_timeout(wait) else {
            return Ok(false);
        };
        self.dispatch(map_event(first))?;
        while let Some(event) = self.engine.try_recv() {
            self.dispatch(map_event(event))?;
        }
        Ok(true)
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn render(&mut self) -> io::Result<()> {
        let at = chrono::Local::now().format("%H:%M:%S").to_string();
        writeln!(self.out, "{}", render(&self.state.view(), &at))?;
        self.out.flush()
    }

    pub fn run(mut self, inputs: mpsc::Receiver<Input>, autostart: bool) -> anyhow::Result<()> {
        writeln!(self.out, "{HELP}")?;
        if let Some(hint) = stdin_hint(self.state.settings().threshold, self.has_decoder) {
            writeln!(self.out, "{hint}")?;
        }
        self.render()?;
        if autostart {
            self.dispatch(Msg::StartClicked)?;
        }

        let mut quit_deadline: Option<Instant> = None;
        loop {
            loop {
                match inputs.try_recv() {
                    Ok(Input::Msg(msg)) => self.dispatch(msg)?,
                    Ok(Input::Unknown(command)) => {
                        scanner_warn!("Unknown command {}", command);
                        writeln!(self.out, "unknown command {command}; {HELP}")?;
                    }
                    Ok(Input::Quit) | Err(TryRecvError::Disconnected) => {
                        if quit_deadline.is_none() {
                            scanner_info!("Quit requested");
                            self.dispatch(Msg::StopClicked)?;
                            quit_deadline = Some(Instant::now() + QUIT_GRACE);
                        }
                        break;
                    }
                    Err(TryRecvError::Empty) => break,
                }
            }

            if let Some(deadline) = quit_deadline {
                if !self.state.has_pending_lookups() {
                    break;
                }
                if Instant::now() >= deadline {
                    scanner_warn!("Quitting with lookups still in flight");
                    break;
                }
            }

            if !self.pump_engine(self.tick)? {
                self.dispatch(Msg::Tick)?;
            }
        }

        self.effects.shutdown();
        scanner_info!("Scanner stopped with {} books", self.state().catalog().len());
        Ok(())
    }
}
