use super::SelectionSender;
use crate::engine::SelectionEvent;
use crate::lighting::PRESETS;
use crate::scene::ModelKind;
use crate::texture::TextureFactory;

/// One selectable option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelOption {
    /// Short name.
    pub label: String,
    /// Icon glyph.
    pub icon: String,
    /// Longer description.
    pub description: String,
}

impl PanelOption {
    /// Build an option from string slices.
    #[must_use]
    pub fn new(label: &str, icon: &str, description: &str) -> Self {
        Self {
            label: label.to_owned(),
            icon: icon.to_owned(),
            description: description.to_owned(),
        }
    }
}

/// Which selection a panel drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    /// Surface texture.
    Textures,
    /// Lighting preset.
    Lights,
    /// Model shape.
    Models,
}

impl PanelKind {
    /// The event that activating option `index` emits.
    #[must_use]
    pub fn event(self, index: usize) -> SelectionEvent {
        match self {
            PanelKind::Textures => SelectionEvent::Texture(index),
            PanelKind::Lights => SelectionEvent::Light(index),
            PanelKind::Models => SelectionEvent::Model(index),
        }
    }
}

/// Ordered options with exactly one active.
#[derive(Debug)]
pub struct Panel {
    kind: PanelKind,
    options: Vec<PanelOption>,
    active: Option<usize>,
    tx: SelectionSender,
}

impl Panel {
    /// Build a panel and activate its first option, if any.
    #[must_use]
    pub fn new(
        kind: PanelKind,
        options: Vec<PanelOption>,
        tx: SelectionSender,
    ) -> Self {
        let mut panel = Self {
            kind,
            options,
            active: None,
            tx,
        };
        let _ = panel.activate(0);
        panel
    }

    /// Make option `index` active and emit its event. Returns `false` for
    /// an out-of-range index.
    pub fn activate(&mut self, index: usize) -> bool {
        if index >= self.options.len() {
            return false;
        }
        self.active = Some(index);
        if self.tx.send(self.kind.event(index)).is_err() {
            log::debug!("{:?} panel: selection bus closed", self.kind);
        }
        true
    }

    /// What this panel selects.
    #[must_use]
    pub fn kind(&self) -> PanelKind {
        self.kind
    }

    /// The options, in order.
    #[must_use]
    pub fn options(&self) -> &[PanelOption] {
        &self.options
    }

    /// Index of the active option.
    #[must_use]
    pub fn active(&self) -> Option<usize> {
        self.active
    }
}

/// The viewer's three panels: textures, lights, models.
#[derive(Debug)]
pub struct Panels {
    panels: [Panel; 3],
}

impl Panels {
    /// Build the standard panels. Each posts its initial selection.
    #[must_use]
    pub fn standard(tx: &SelectionSender) -> Self {
        let icons = ["\u{1f9f1}", "\u{1f537}", "\u{1f48e}"];
        let texture_descriptions =
            ["Red brick", "Brushed blue metal", "Faceted green gem"];
        let textures = TextureFactory::labels()
            .into_iter()
            .zip(icons)
            .zip(texture_descriptions)
            .map(|((l, i), d)| PanelOption::new(l, i, d))
            .collect();

        let light_icons = ["\u{2600}", "\u{2744}", "\u{1f338}"];
        let light_descriptions =
            ["Golden sunlight", "Blue studio light", "Pink neon glow"];
        let lights = PRESETS
            .iter()
            .zip(light_icons)
            .zip(light_descriptions)
            .map(|((p, i), d)| PanelOption::new(p.label, i, d))
            .collect();

        let model_icons = ["\u{1f9ca}", "\u{1faa9}", "\u{1f6e2}"];
        let models = ModelKind::ALL
            .iter()
            .zip(model_icons)
            .map(|(k, i)| PanelOption::new(k.label(), i, k.label()))
            .collect();

        Self {
            panels: [
                Panel::new(PanelKind::Textures, textures, tx.clone()),
                Panel::new(PanelKind::Lights, lights, tx.clone()),
                Panel::new(PanelKind::Models, models, tx.clone()),
            ],
        }
    }

    /// Panel driving `kind`.
    #[must_use]
    pub fn get(&self, kind: PanelKind) -> &Panel {
        match kind {
            PanelKind::Textures => &self.panels[0],
            PanelKind::Lights => &self.panels[1],
            PanelKind::Models => &self.panels[2],
        }
    }

    /// Activate the option matching `event` on the panel that owns it.
    pub fn activate(&mut self, event: SelectionEvent) -> bool {
        let (slot, index) = match event {
            SelectionEvent::Texture(i) => (0, i),
            SelectionEvent::Light(i) => (1, i),
            SelectionEvent::Model(i) => (2, i),
        };
        self.panels[slot].activate(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::SelectionBus;

    #[test]
    fn first_option_is_auto_activated() {
        let bus = SelectionBus::new();
        let panel = Panel::new(
            PanelKind::Lights,
            vec![PanelOption::new("a", "", ""), PanelOption::new("b", "", "")],
            bus.sender(),
        );
        assert_eq!(panel.active(), Some(0));
        assert_eq!(bus.drain().collect::<Vec<_>>(), vec![SelectionEvent::Light(0)]);
    }

    #[test]
    fn empty_panel_has_no_active_option() {
        let bus = SelectionBus::new();
        let panel = Panel::new(PanelKind::Models, Vec::new(), bus.sender());
        assert_eq!(panel.active(), None);
        assert_eq!(bus.drain().count(), 0);
    }

    #[test]
    fn out_of_range_activation_emits_nothing() {
        let bus = SelectionBus::new();
        let mut panels = Panels::standard(&bus.sender());
        assert_eq!(bus.drain().count(), 3);

        assert!(!panels.activate(SelectionEvent::Texture(3)));
        assert_eq!(panels.get(PanelKind::Textures).active(), Some(0));
        assert_eq!(bus.drain().count(), 0);

        assert!(panels.activate(SelectionEvent::Model(2)));
        assert_eq!(panels.get(PanelKind::Models).active(), Some(2));
        assert_eq!(
            bus.drain().collect::<Vec<_>>(),
            vec![SelectionEvent::Model(2)]
        );
    }

    #[test]
    fn standard_panels_mirror_collaborators() {
        let bus = SelectionBus::new();
        let panels = Panels::standard(&bus.sender());
        assert_eq!(panels.get(PanelKind::Textures).options().len(), 3);
        assert_eq!(panels.get(PanelKind::Lights).options()[2].label, "Neon");
        assert_eq!(panels.get(PanelKind::Models).options()[0].label, "Cube");
    }
}
