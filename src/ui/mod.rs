//! Selection UI model.
//!
//! Panels are headless: they track which option is active and post a
//! [`SelectionEvent`] onto the [`SelectionBus`] whenever one is activated.
//! The host drains the bus once per frame and hands each event to the
//! stage.

mod panel;

use std::sync::mpsc;

pub use panel::{Panel, PanelKind, PanelOption, Panels};

use crate::engine::SelectionEvent;

/// Sending half of the [`SelectionBus`].
pub type SelectionSender = mpsc::Sender<SelectionEvent>;

/// Queue of pending selection events.
#[derive(Debug)]
pub struct SelectionBus {
    tx: SelectionSender,
    rx: mpsc::Receiver<SelectionEvent>,
}

impl Default for SelectionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// A new sender for this bus.
    #[must_use]
    pub fn sender(&self) -> SelectionSender {
        self.tx.clone()
    }

    /// Take every queued event, oldest first, without blocking.
    pub fn drain(&self) -> impl Iterator<Item = SelectionEvent> + '_ {
        self.rx.try_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_yields_in_order_then_empties() {
        let bus = SelectionBus::new();
        let tx = bus.sender();
        tx.send(SelectionEvent::Texture(1)).unwrap();
        tx.send(SelectionEvent::Model(2)).unwrap();

        let events: Vec<_> = bus.drain().collect();
        assert_eq!(
            events,
            vec![SelectionEvent::Texture(1), SelectionEvent::Model(2)]
        );
        assert_eq!(bus.drain().count(), 0);
    }
}
