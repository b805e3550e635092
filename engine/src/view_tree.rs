use serde::{Deserialize, Serialize};

use crate::graphics::{Color, Renderer2d};
use crate::ui::Rect;

/// Flat, back-to-front list of everything drawn in a frame.
///
/// Built fresh from game state every frame; the same tree drives both painting and button hit
/// testing, so what you see is what you can click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewTree<A> {
    pub nodes: Vec<ViewNode<A>>,
}

impl<A> Default for ViewTree<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> ViewTree<A> {
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub fn push(&mut self, node: ViewNode<A>) {
        self.nodes.push(node);
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn buttons(&self) -> impl Iterator<Item = &ButtonNode<A>> {
        self.nodes.iter().filter_map(|n| match n {
            ViewNode::Button(b) => Some(b),
            _ => None,
        })
    }

    pub fn button(&self, id: u32) -> Option<&ButtonNode<A>> {
        self.buttons().find(|b| b.id == id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ViewNode<A> {
    Rect(RectNode),
    Disc(DiscNode),
    Text(TextNode),
    Button(ButtonNode<A>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RectNode {
    pub rect: Rect,
    pub color: Color,
    /// 255 paints opaque; anything lower blends over what is already there.
    pub alpha: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscNode {
    pub center: (u32, u32),
    pub radius: u32,
    pub color: Color,
    pub alpha: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextNode {
    /// Centre of the text block.
    pub center: (u32, u32),
    pub text: String,
    pub color: Color,
    pub scale: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonNode<A> {
    pub id: u32,
    pub rect: Rect,
    pub label: String,
    pub action: A,
    pub enabled: bool,
    pub fill: Color,
    pub text_color: Color,
}

/// Pointer state for one frame, as far as button hit testing cares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiInput {
    pub mouse_pos: Option<(u32, u32)>,
    pub mouse_down: bool,
    pub mouse_up: bool,
}

const BUTTON_TEXT_SCALE: u32 = 2;
const DISABLED_DIM: Color = [40, 40, 40, 255];
const DISABLED_DIM_ALPHA: u8 = 140;

pub fn hit_test_actions<A: Clone>(view: &ViewTree<A>, input: UiInput) -> Vec<A> {
    if !input.mouse_up {
        return Vec::new();
    }
    let Some((mx, my)) = input.mouse_pos else {
        return Vec::new();
    };
    // Topmost button wins.
    view.nodes
        .iter()
        .rev()
        .find_map(|node| match node {
            ViewNode::Button(button) if button.enabled && button.rect.contains(mx, my) => {
                Some(button.action.clone())
            }
            _ => None,
        })
        .into_iter()
        .collect()
}

pub fn paint<A>(view: &ViewTree<A>, gfx: &mut dyn Renderer2d) {
    for node in &view.nodes {
        match node {
            ViewNode::Rect(r) => gfx.blend_rect(r.rect, r.color, r.alpha),
            ViewNode::Disc(d) => {
                gfx.blend_circle(d.center.0, d.center.1, d.radius, d.color, d.alpha)
            }
            ViewNode::Text(t) => {
                gfx.draw_text_centered(t.center.0, t.center.1, &t.text, t.color, t.scale)
            }
            ViewNode::Button(b) => {
                gfx.fill_rect(b.rect, b.fill);
                let (cx, cy) = b.rect.center();
                gfx.draw_text_centered(cx, cy, &b.label, b.text_color, BUTTON_TEXT_SCALE);
                if !b.enabled {
                    gfx.blend_rect(b.rect, DISABLED_DIM, DISABLED_DIM_ALPHA);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::{RgbaBufferSurface, SurfaceSize};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    enum Action {
        Go,
        Stop,
    }

    fn button(id: u32, rect: Rect, action: Action, enabled: bool) -> ViewNode<Action> {
        ViewNode::Button(ButtonNode {
            id,
            rect,
            label: "GO".to_string(),
            action,
            enabled,
            fill: [200, 100, 0, 255],
            text_color: [0, 0, 0, 255],
        })
    }

    fn click(x: u32, y: u32) -> UiInput {
        UiInput {
            mouse_pos: Some((x, y)),
            mouse_down: false,
            mouse_up: true,
        }
    }

    #[test]
    fn click_inside_enabled_button_yields_action() {
        let mut view = ViewTree::new();
        view.push(button(1, Rect::new(0, 0, 10, 10), Action::Go, true));
        assert_eq!(hit_test_actions(&view, click(5, 5)), vec![Action::Go]);
        assert!(hit_test_actions(&view, click(50, 5)).is_empty());
    }

    #[test]
    fn disabled_buttons_are_not_clickable() {
        let mut view = ViewTree::new();
        view.push(button(1, Rect::new(0, 0, 10, 10), Action::Go, false));
        assert!(hit_test_actions(&view, click(5, 5)).is_empty());
    }

    #[test]
    fn topmost_overlapping_button_wins() {
        let mut view = ViewTree::new();
        view.push(button(1, Rect::new(0, 0, 10, 10), Action::Go, true));
        view.push(button(2, Rect::new(5, 5, 10, 10), Action::Stop, true));
        assert_eq!(hit_test_actions(&view, click(7, 7)), vec![Action::Stop]);
    }

    #[test]
    fn mouse_down_alone_does_not_click() {
        let mut view = ViewTree::new();
        view.push(button(1, Rect::new(0, 0, 10, 10), Action::Go, true));
        let input = UiInput {
            mouse_pos: Some((5, 5)),
            mouse_down: true,
            mouse_up: false,
        };
        assert!(hit_test_actions(&view, input).is_empty());
    }

    #[test]
    fn paint_dims_disabled_buttons() {
        let size = SurfaceSize::new(80, 20);
        let mut view = ViewTree::new();
        view.push(button(1, Rect::new(0, 0, 40, 20), Action::Go, true));
        view.push(button(2, Rect::new(40, 0, 40, 20), Action::Stop, false));

        let mut surface = RgbaBufferSurface::new(size);
        paint(&view, &mut surface.renderer());

        let enabled = surface.pixel(0, 0).unwrap();
        let disabled = surface.pixel(40, 0).unwrap();
        assert_eq!(enabled, [200, 100, 0, 255]);
        assert!(disabled[0] < enabled[0]);
    }

    #[test]
    fn view_tree_serializes() {
        let mut view = ViewTree::new();
        view.push(button(7, Rect::new(1, 2, 3, 4), Action::Go, true));
        let json = serde_json::to_string(&view).expect("serialize view tree");
        let back: ViewTree<Action> = serde_json::from_str(&json).expect("deserialize view tree");
        assert_eq!(back.button(7).map(|b| b.action), Some(Action::Go));
    }
}
