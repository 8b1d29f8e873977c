//! Rendering backends

use super::figure::Figure;
use crate::dispatch::SelectionSender;
use crate::error::Result;

/// Turns figures into output and optionally reports point selections
pub trait RenderBackend {
    /// Draw `figure` as a new, independently owned output
    fn present(&mut self, figure: &Figure) -> Result<()>;

    /// Register the channel pickable points report selections on
    ///
    /// Non-interactive backends never emit selections and keep the default.
    fn connect_selection(&mut self, _sender: SelectionSender) {}
}

/// Keeps every presented figure in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pub figures: Vec<Figure>,
    selection: Option<SelectionSender>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a user picking strip points
    ///
    /// Returns false when no channel is connected or the receiver is gone.
    pub fn pick(&self, indices: Vec<usize>) -> bool {
        match &self.selection {
            Some(tx) => tx
                .send(crate::dispatch::SelectionEvent::new(indices))
                .is_ok(),
            None => false,
        }
    }

    /// Simulate a click at pixel (`px`, `py`) on stored figure `figure`
    ///
    /// Pickable points within their marker's pick radius are reported as one
    /// selection. Returns false when nothing was hit or nothing was sent.
    pub fn click(&self, figure: usize, px: f64, py: f64) -> bool {
        let hits = match self.figures.get(figure) {
            Some(f) => f.pick(px, py),
            None => return false,
        };
        !hits.is_empty() && self.pick(hits)
    }

    /// Release all stored figures
    pub fn close_all(&mut self) -> usize {
        let n = self.figures.len();
        self.figures.clear();
        n
    }
}

impl RenderBackend for MemoryBackend {
    fn present(&mut self, figure: &Figure) -> Result<()> {
        self.figures.push(figure.clone());
        Ok(())
    }

    fn connect_selection(&mut self, sender: SelectionSender) {
        self.selection = Some(sender);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::selection_channel;

    #[test]
    fn test_memory_backend_keeps_figures() {
        let mut backend = MemoryBackend::new();
        backend.present(&Figure::new((10, 10))).unwrap();
        backend.present(&Figure::new((20, 20))).unwrap();
        assert_eq!(backend.figures.len(), 2);
        assert_eq!(backend.close_all(), 2);
        assert!(backend.figures.is_empty());
    }

    #[test]
    fn test_click_on_strip_point() {
        use crate::render::{MarkerStyle, Panel, PanelRect, PanelRole, PlotItem};

        let strip = Panel::new(PanelRole::Strip, PanelRect::new(0.0, 0.0, 1.0, 1.0))
            .with_item(PlotItem::Points {
                x: vec![0.0; 4],
                y: vec![0.5, 1.5, 2.5, 3.5],
                style: MarkerStyle::default(),
                pickable: true,
            })
            .with_x_range(-1.0, 1.0)
            .with_y_range(0.0, 4.0);
        let mut backend = MemoryBackend::new();
        backend.present(&Figure::new((40, 400)).with_panel(strip)).unwrap();
        let (tx, rx) = selection_channel();
        backend.connect_selection(tx);

        // Strip point 1 (y = 1.5) is drawn at pixel (20, 250)
        assert!(backend.click(0, 21.0, 252.0));
        assert!(!backend.click(0, 20.0, 200.0));
        assert!(!backend.click(3, 20.0, 250.0));
        drop(backend);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].indices, vec![1]);
    }

    #[test]
    fn test_pick_sends_over_connected_channel() {
        let mut backend = MemoryBackend::new();
        assert!(!backend.pick(vec![1]));

        let (tx, rx) = selection_channel();
        backend.connect_selection(tx);
        assert!(backend.pick(vec![4, 2]));
        assert_eq!(rx.recv().unwrap().indices, vec![4, 2]);
    }
}
