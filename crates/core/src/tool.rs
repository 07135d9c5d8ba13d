//! Tool state machine and instrument bar model
//!
//! Exactly one tool is active. The instrument bar mixes tool instruments,
//! which stay selected, with one-shot command instruments (undo, redo, trash,
//! color pick) that never change the persistent tool.

use crate::annotation::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Active drawing tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    Pen,
    Eraser,
    Text,
    #[default]
    Disabled,
}

impl Tool {
    /// Whether touches on the page are routed to this tool
    pub fn is_drawing(self) -> bool {
        !matches!(self, Tool::Disabled)
    }
}

/// Instrument bar entries, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentId {
    Pencil,
    Text,
    Erase,
    ArrowLeft,
    ArrowRight,
    ColorPick,
    Trash,
}

impl InstrumentId {
    pub const ALL: [InstrumentId; 7] = [
        InstrumentId::Pencil,
        InstrumentId::Text,
        InstrumentId::Erase,
        InstrumentId::ArrowLeft,
        InstrumentId::ArrowRight,
        InstrumentId::ColorPick,
        InstrumentId::Trash,
    ];

    /// Icon name shown by the host
    pub fn icon(self) -> &'static str {
        match self {
            InstrumentId::Pencil => "pencil",
            InstrumentId::Text => "text",
            InstrumentId::Erase => "erase",
            InstrumentId::ArrowLeft => "arrow_left",
            InstrumentId::ArrowRight => "arrow_right",
            InstrumentId::ColorPick => "color_pick",
            InstrumentId::Trash => "trash",
        }
    }

    /// Tool selected by this instrument, if it is a tool instrument
    pub fn tool(self) -> Option<Tool> {
        match self {
            InstrumentId::Pencil => Some(Tool::Pen),
            InstrumentId::Text => Some(Tool::Text),
            InstrumentId::Erase => Some(Tool::Eraser),
            _ => None,
        }
    }

    /// Command run by this instrument, if it is a one-shot instrument
    pub fn command(self) -> Option<Command> {
        match self {
            InstrumentId::ArrowLeft => Some(Command::Undo),
            InstrumentId::ArrowRight => Some(Command::Redo),
            InstrumentId::ColorPick => Some(Command::ColorPick),
            InstrumentId::Trash => Some(Command::Trash),
            _ => None,
        }
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.icon())
    }
}

/// One-shot instrument action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Undo,
    Redo,
    ColorPick,
    Trash,
}

/// Instrument as presented to the host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentViewModel {
    pub id: InstrumentId,
    pub icon: &'static str,
    pub tint: Color,
    pub selected: bool,
}

/// Notification delivered to subscribers
#[derive(Debug, Clone, PartialEq)]
pub enum ToolEvent {
    /// The instrument bar changed (selection, redo availability or color)
    SelectionChanged(Vec<InstrumentViewModel>),
    /// The host should present its drawing settings panel
    DrawConfigurationRequested,
}

/// Outcome of selecting an instrument
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The persistent tool changed
    ToolChanged { from: Tool, to: Tool },
    /// A one-shot command should run; the tool is unchanged
    Command(Command),
    /// Nothing to do
    Unchanged,
}

/// Handle returned by [`ToolStateMachine::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&ToolEvent)>;

/// Current tool plus the observers of instrument changes
#[derive(Default)]
pub struct ToolStateMachine {
    tool: Tool,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    published: Option<Vec<InstrumentViewModel>>,
}

impl fmt::Debug for ToolStateMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolStateMachine")
            .field("tool", &self.tool)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl ToolStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Select an instrument
    ///
    /// Selecting the active tool's instrument again turns it off.
    pub fn select(&mut self, instrument: InstrumentId) -> Selection {
        if let Some(command) = instrument.command() {
            return Selection::Command(command);
        }
        let Some(tool) = instrument.tool() else {
            return Selection::Unchanged;
        };
        let to = if self.tool == tool { Tool::Disabled } else { tool };
        self.set_tool(to)
    }

    /// Deselect an instrument; only the active tool's instrument has effect
    pub fn deselect(&mut self, instrument: InstrumentId) -> Selection {
        match instrument.tool() {
            Some(tool) if tool == self.tool => self.set_tool(Tool::Disabled),
            _ => Selection::Unchanged,
        }
    }

    /// Switch tools directly
    pub fn set_tool(&mut self, to: Tool) -> Selection {
        let from = self.tool;
        if from == to {
            return Selection::Unchanged;
        }
        self.tool = to;
        debug!(?from, ?to, "tool changed");
        Selection::ToolChanged { from, to }
    }

    /// Instrument bar for the current tool
    pub fn instruments(&self, can_redo: bool, drawing_color: Color) -> Vec<InstrumentViewModel> {
        InstrumentId::ALL
            .iter()
            .map(|&id| {
                let tint = match id {
                    InstrumentId::ArrowRight if !can_redo => Color::LIGHT_GRAY,
                    InstrumentId::ColorPick => drawing_color,
                    _ => Color::BLACK,
                };
                InstrumentViewModel {
                    id,
                    icon: id.icon(),
                    tint,
                    selected: id.tool() == Some(self.tool),
                }
            })
            .collect()
    }

    /// Register an observer of [`ToolEvent`]s
    pub fn subscribe(&mut self, subscriber: impl FnMut(&ToolEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        before != self.subscribers.len()
    }

    /// Announce the instrument bar if it differs from the last announcement
    pub fn publish(&mut self, instruments: Vec<InstrumentViewModel>) -> bool {
        if self.published.as_ref() == Some(&instruments) {
            return false;
        }
        self.published = Some(instruments.clone());
        self.emit(&ToolEvent::SelectionChanged(instruments));
        true
    }

    pub fn emit(&mut self, event: &ToolEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_select_and_toggle() {
        let mut machine = ToolStateMachine::new();
        assert_eq!(machine.tool(), Tool::Disabled);

        assert_eq!(
            machine.select(InstrumentId::Pencil),
            Selection::ToolChanged { from: Tool::Disabled, to: Tool::Pen }
        );
        assert_eq!(
            machine.select(InstrumentId::Erase),
            Selection::ToolChanged { from: Tool::Pen, to: Tool::Eraser }
        );
        assert_eq!(
            machine.select(InstrumentId::Erase),
            Selection::ToolChanged { from: Tool::Eraser, to: Tool::Disabled }
        );
    }

    #[test]
    fn test_commands_keep_tool() {
        let mut machine = ToolStateMachine::new();
        machine.select(InstrumentId::Text);

        assert_eq!(machine.select(InstrumentId::ArrowLeft), Selection::Command(Command::Undo));
        assert_eq!(machine.select(InstrumentId::ArrowRight), Selection::Command(Command::Redo));
        assert_eq!(machine.select(InstrumentId::Trash), Selection::Command(Command::Trash));
        assert_eq!(
            machine.select(InstrumentId::ColorPick),
            Selection::Command(Command::ColorPick)
        );
        assert_eq!(machine.tool(), Tool::Text);
    }

    #[test]
    fn test_deselect_only_active() {
        let mut machine = ToolStateMachine::new();
        machine.select(InstrumentId::Pencil);

        assert_eq!(machine.deselect(InstrumentId::Erase), Selection::Unchanged);
        assert_eq!(machine.tool(), Tool::Pen);
        assert_eq!(
            machine.deselect(InstrumentId::Pencil),
            Selection::ToolChanged { from: Tool::Pen, to: Tool::Disabled }
        );
    }

    #[test]
    fn test_instrument_tints_and_selection() {
        let mut machine = ToolStateMachine::new();
        machine.select(InstrumentId::Pencil);
        let blue = Color::rgb(0.0, 0.0, 1.0);

        let bar = machine.instruments(false, blue);
        let ids: Vec<_> = bar.iter().map(|i| i.icon).collect();
        assert_eq!(
            ids,
            vec!["pencil", "text", "erase", "arrow_left", "arrow_right", "color_pick", "trash"]
        );
        assert!(bar[0].selected);
        assert!(bar.iter().skip(1).all(|i| !i.selected));
        assert_eq!(bar[4].tint, Color::LIGHT_GRAY);
        assert_eq!(bar[5].tint, blue);
        assert_eq!(bar[3].tint, Color::BLACK);

        let bar = machine.instruments(true, blue);
        assert_eq!(bar[4].tint, Color::BLACK);
    }

    #[test]
    fn test_publish_deduplicates() {
        let mut machine = ToolStateMachine::new();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        let id = machine.subscribe(move |event: &ToolEvent| sink.borrow_mut().push(event.clone()));

        let bar = machine.instruments(false, Color::RED);
        assert!(machine.publish(bar.clone()));
        assert!(!machine.publish(bar));
        assert_eq!(events.borrow().len(), 1);

        machine.select(InstrumentId::Text);
        let bar = machine.instruments(false, Color::RED);
        assert!(machine.publish(bar));
        assert_eq!(events.borrow().len(), 2);

        assert!(machine.unsubscribe(id));
        machine.emit(&ToolEvent::DrawConfigurationRequested);
        assert_eq!(events.borrow().len(), 2);
    }

    #[test]
    fn test_instrument_serde_names() {
        let json = serde_json::to_string(&InstrumentId::ArrowRight).unwrap();
        assert_eq!(json, "\"arrow_right\"");
        let parsed: InstrumentId = serde_json::from_str("\"color_pick\"").unwrap();
        assert_eq!(parsed, InstrumentId::ColorPick);
    }
}
