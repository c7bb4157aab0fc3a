use crate::geo::LatLng;
use crate::input::Mode;
use crate::surface::MapSurface;
use log::debug;

use super::Annotator;

/// Pointer gesture state.
///
/// Replaced as a whole on every transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture<L> {
    /// Waiting for a draw gesture
    Idle,
    /// Pointer held in draw mode
    Capturing {
        /// Points traced so far
        points: Vec<LatLng>,
        /// Temporary trace layers shown while drawing
        traces: Vec<L>,
    },
}

impl<L> Gesture<L> {
    pub fn is_capturing(&self) -> bool {
        matches!(self, Gesture::Capturing { .. })
    }

    pub fn points(&self) -> &[LatLng] {
        match self {
            Gesture::Idle => &[],
            Gesture::Capturing { points, .. } => points,
        }
    }

    pub fn trace_count(&self) -> usize {
        match self {
            Gesture::Idle => 0,
            Gesture::Capturing { traces, .. } => traces.len(),
        }
    }
}

impl<S: MapSurface> Annotator<S> {
    pub fn gesture(&self) -> &Gesture<S::Layer> {
        &self.gesture
    }

    pub fn is_capturing(&self) -> bool {
        self.gesture.is_capturing()
    }

    /// Number of temporary trace layers of the in-progress capture.
    pub fn trace_count(&self) -> usize {
        self.gesture.trace_count()
    }

    /// Processes a pointer press.
    ///
    /// # Behavior
    /// - In draw mode: starts a new capture with no points
    /// - Other modes: ignored (pins and circles are placed on click)
    pub fn on_pointer_down(&mut self, _at: LatLng) {
        if !self.attached || self.mode != Mode::Draw {
            return;
        }
        self.cancel_capture();
        self.gesture = Gesture::Capturing {
            points: Vec::new(),
            traces: Vec::new(),
        };
        debug!("Capture started");
    }

    /// Processes pointer motion.
    ///
    /// While capturing, appends `at` and shows a trace of the whole
    /// sequence so far.
    pub fn on_pointer_move(&mut self, at: LatLng) {
        if !self.attached {
            return;
        }
        let Gesture::Capturing { points, traces } = &mut self.gesture else {
            return;
        };
        points.push(at);
        if let Some(surface) = self.surface.as_mut() {
            if let Some(trace) = surface.add_polyline(points, &self.styles.path) {
                traces.push(trace);
            }
        }
    }

    /// Processes a pointer release.
    ///
    /// # Behavior
    /// When capturing: removes the traces, commits the traced points as a
    /// polygon and leaves draw mode.
    pub fn on_pointer_up(&mut self, _at: LatLng) {
        if !self.attached || !self.gesture.is_capturing() {
            return;
        }

        let Gesture::Capturing { points, traces } =
            std::mem::replace(&mut self.gesture, Gesture::Idle)
        else {
            return;
        };
        self.remove_traces(&traces);

        debug!("Capture finished with {} point(s)", points.len());
        self.add_line(points, None);
        self.set_mode(Mode::Idle);
    }

    /// Processes a single-point click.
    ///
    /// Places a marker in pin mode or a circle in circle mode; the mode stays
    /// as it is so several shapes can be placed in a row.
    pub fn on_click(&mut self, at: LatLng) {
        if !self.attached {
            return;
        }
        match self.mode {
            Mode::Pin => {
                self.add_marker(at, None);
            }
            Mode::Circle => {
                self.add_circle(at, None);
            }
            Mode::Draw | Mode::Idle => {}
        }
    }

    /// Drops an in-progress capture together with its traces.
    pub(super) fn cancel_capture(&mut self) {
        if let Gesture::Capturing { traces, .. } = std::mem::replace(&mut self.gesture, Gesture::Idle)
        {
            self.remove_traces(&traces);
        }
    }

    fn remove_traces(&mut self, traces: &[S::Layer]) {
        if let Some(surface) = self.surface.as_mut() {
            for trace in traces {
                surface.remove_layer(trace);
            }
        }
    }
}
