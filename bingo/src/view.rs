use engine::graphics::{Color, text_height, text_width};
use engine::surface::SurfaceSize;
use engine::ui::{Anchor, Insets, Rect, Size};
use engine::view_tree::{ButtonNode, DiscNode, RectNode, TextNode, ViewNode, ViewTree};
use serde::{Deserialize, Serialize};

use crate::board::{COLUMN_LEN, MAX_NUMBER, board};
use crate::session::SessionSnapshot;

pub const TITLE: &str = "BINGO NUMBER ROULETTE";
pub const DRAW_LABEL: &str = "DRAW NUMBER";
pub const ROLLING_LABEL: &str = "ROLLING...";
pub const RESET_LABEL: &str = "RESET";

pub const UI_DRAW_BUTTON: u32 = 1;
pub const UI_RESET_BUTTON: u32 = 2;

pub const BACKGROUND: Color = [15, 32, 39, 255];
pub const TEXT: Color = [255, 255, 255, 255];
pub const DARK_TEXT: Color = [0, 0, 0, 255];
pub const BALL_RED: Color = [231, 76, 60, 255];
pub const BALL_FACE: Color = [255, 255, 255, 255];
pub const GOLD: Color = [255, 215, 0, 255];
pub const HEADER: Color = [241, 196, 15, 255];
pub const CELL: Color = [255, 255, 255, 255];
pub const CELL_ALPHA: u8 = 38;
pub const DRAWN: Color = [46, 204, 113, 255];
pub const DRAW_BUTTON: Color = [243, 156, 18, 255];
pub const RESET_BUTTON: Color = [192, 57, 43, 255];

const PANEL_ALPHA: u8 = 13;
const GLOW_ALPHA: u8 = 70;
const BOARD_ROWS: u32 = COLUMN_LEN as u32 + 1;
const BOARD_COLUMNS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BingoAction {
    Draw,
    Reset,
}

/// Where everything goes for a given window size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BingoLayout {
    pub title: Rect,
    /// Square the ball (and its glow) is centred in.
    pub ball: Rect,
    pub status: Rect,
    pub draw_button: Rect,
    pub reset_button: Rect,
    /// Panel behind the board.
    pub board_panel: Rect,
    board: Rect,
    gap: u32,
}

impl BingoLayout {
    pub fn compute(size: SurfaceSize) -> Self {
        let margin = (size.width.min(size.height) / 40).max(4);
        let screen = Rect::from_size(size.width, size.height).inset(Insets::all(margin));

        let title_h = text_height(title_scale(size)) + margin;
        let title = Rect::new(screen.x, screen.y, screen.w, title_h);
        let content = Rect::new(
            screen.x,
            title.bottom() + margin,
            screen.w,
            screen.h.saturating_sub(title_h + margin),
        );

        // Board takes the right side; the ball column gets what's left.
        let board_w = (content.w * 2 / 5).max(content.h * 5 / 8).min(content.w * 3 / 5);
        let (left, board_panel) = content.split_right(board_w, margin * 2);
        let board = board_panel.inset(Insets::all(margin / 2 + 2));
        let gap = (board.h / BOARD_ROWS / 8).max(1);

        let button_h = (left.h / 10).clamp(24, 56);
        let status_h = text_height(2) + margin;
        let ball_side = left
            .w
            .min(left.h.saturating_sub(button_h + status_h + margin * 3));
        let stack_h = ball_side + margin + status_h + margin + button_h;
        let stack = left.place(Size::new(left.w, stack_h), Anchor::Center);

        let ball = stack.place(Size::new(ball_side, ball_side), Anchor::TopCenter);
        let status = Rect::new(stack.x, ball.bottom() + margin, stack.w, status_h);
        let buttons = Rect::new(stack.x, status.bottom() + margin, stack.w, button_h);
        let buttons = buttons.place(Size::new(buttons.w.min(480), button_h), Anchor::Center);
        let (draw_button, reset_button) = buttons.split_right(buttons.w * 2 / 5, margin);

        Self {
            title,
            ball,
            status,
            draw_button,
            reset_button,
            board_panel,
            board,
            gap,
        }
    }

    pub fn header_rect(&self, column: usize) -> Rect {
        self.board
            .column(column as u32, BOARD_COLUMNS, self.gap * 2)
            .row(0, BOARD_ROWS, self.gap)
    }

    /// Cell for the `row`th number (0-based) of `column`.
    pub fn cell_rect(&self, column: usize, row: usize) -> Rect {
        self.board
            .column(column as u32, BOARD_COLUMNS, self.gap * 2)
            .row(row as u32 + 1, BOARD_ROWS, self.gap)
    }

    /// Radius of the ball; the final ball is drawn 10% larger.
    pub fn ball_radius(&self, emphasised: bool) -> u32 {
        let full = self.ball.w.min(self.ball.h) / 2;
        let base = full * 10 / 12;
        if emphasised { base * 11 / 10 } else { base }
    }
}

fn title_scale(size: SurfaceSize) -> u32 {
    (size.width / 240).clamp(2, 5)
}

/// Largest text scale at which `text` fits in `w` x `h`.
fn fit_scale(text: &str, w: u32, h: u32) -> u32 {
    let mut scale = 1;
    while text_width(text, scale + 1) <= w && text_height(scale + 1) <= h {
        scale += 1;
    }
    scale
}

fn push_text(
    tree: &mut ViewTree<BingoAction>,
    center: (u32, u32),
    text: &str,
    color: Color,
    scale: u32,
) {
    tree.push(ViewNode::Text(TextNode {
        center,
        text: text.to_string(),
        color,
        scale,
    }));
}

fn push_rect(tree: &mut ViewTree<BingoAction>, rect: Rect, color: Color, alpha: u8) {
    tree.push(ViewNode::Rect(RectNode { rect, color, alpha }));
}

fn push_disc(
    tree: &mut ViewTree<BingoAction>,
    center: (u32, u32),
    radius: u32,
    color: Color,
    alpha: u8,
) {
    tree.push(ViewNode::Disc(DiscNode {
        center,
        radius,
        color,
        alpha,
    }));
}

/// The whole frame for `snapshot`. Pure: the same snapshot and size always give the same tree.
pub fn build_view(snapshot: &SessionSnapshot, size: SurfaceSize) -> ViewTree<BingoAction> {
    let layout = BingoLayout::compute(size);
    let mut tree = ViewTree::new();

    push_rect(&mut tree, Rect::from_size(size.width, size.height), BACKGROUND, 255);
    let (tx, ty) = layout.title.center();
    push_text(&mut tree, (tx, ty), TITLE, TEXT, title_scale(size));

    push_ball(&mut tree, &layout, snapshot);

    let status = format!("DRAWN {}/{}", snapshot.drawn.len(), MAX_NUMBER);
    push_text(&mut tree, layout.status.center(), &status, TEXT, 2);

    let rolling = snapshot.is_rolling();
    tree.push(ViewNode::Button(ButtonNode {
        id: UI_DRAW_BUTTON,
        rect: layout.draw_button,
        label: if rolling { ROLLING_LABEL } else { DRAW_LABEL }.to_string(),
        action: BingoAction::Draw,
        enabled: snapshot.can_draw,
        fill: DRAW_BUTTON,
        text_color: DARK_TEXT,
    }));
    tree.push(ViewNode::Button(ButtonNode {
        id: UI_RESET_BUTTON,
        rect: layout.reset_button,
        label: RESET_LABEL.to_string(),
        action: BingoAction::Reset,
        enabled: true,
        fill: RESET_BUTTON,
        text_color: TEXT,
    }));

    push_board(&mut tree, &layout, snapshot);
    tree
}

fn push_ball(tree: &mut ViewTree<BingoAction>, layout: &BingoLayout, snapshot: &SessionSnapshot) {
    let emphasised = snapshot.final_ball.is_some();
    let center = layout.ball.center();
    let radius = layout.ball_radius(emphasised);
    let (glow, glow_radius) = if emphasised {
        (GOLD, radius + radius / 5)
    } else {
        (BALL_RED, radius + radius / 8)
    };

    push_disc(tree, center, glow_radius, glow, GLOW_ALPHA);
    push_disc(tree, center, radius, BALL_RED, 255);
    // Lighter face toward the top, like a lit sphere.
    push_disc(
        tree,
        (center.0, center.1.saturating_sub(radius / 6)),
        radius * 3 / 4,
        BALL_FACE,
        90,
    );

    let face = radius * 3 / 2;
    match snapshot.current {
        Some(ball) => {
            let number = ball.number().to_string();
            let number_scale = fit_scale("88", face, face / 2);
            let letter_scale = (number_scale * 5 / 8).max(1);
            let letter_h = text_height(letter_scale);
            let number_h = text_height(number_scale);
            let spacing = letter_scale * 2;
            let top = center.1.saturating_sub((letter_h + spacing + number_h) / 2);
            let letter = ball.letter().to_string();
            push_text(tree, (center.0, top + letter_h / 2), &letter, TEXT, letter_scale);
            push_text(
                tree,
                (center.0, top + letter_h + spacing + number_h / 2),
                &number,
                TEXT,
                number_scale,
            );
        }
        None => {
            let scale = fit_scale("--", face, face / 2);
            push_text(tree, center, "--", TEXT, scale);
        }
    }
}

fn push_board(tree: &mut ViewTree<BingoAction>, layout: &BingoLayout, snapshot: &SessionSnapshot) {
    push_rect(tree, layout.board_panel, CELL, PANEL_ALPHA);

    let probe = layout.cell_rect(0, 0);
    let cell_scale = fit_scale("88", probe.w * 3 / 4, probe.h * 3 / 5);
    let header_scale = fit_scale("B", probe.w, probe.h * 4 / 5);

    for (col, column) in board(&snapshot.drawn).iter().enumerate() {
        let header = layout.header_rect(col);
        let letter = column.column.letter().to_string();
        push_text(tree, header.center(), &letter, HEADER, header_scale);

        for (row, cell) in column.cells.iter().enumerate() {
            let rect = layout.cell_rect(col, row);
            let label = cell.ball.number().to_string();
            if cell.drawn {
                push_rect(tree, rect, DRAWN, 255);
                push_text(tree, rect.center(), &label, DARK_TEXT, cell_scale);
            } else {
                push_rect(tree, rect, CELL, CELL_ALPHA);
                push_text(tree, rect.center(), &label, TEXT, cell_scale);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Ball;
    use crate::draw::DrawnSet;
    use crate::session::RollPhase;

    const SIZE: SurfaceSize = SurfaceSize::new(960, 720);

    fn snapshot_with(drawn: &[u8]) -> SessionSnapshot {
        let mut set = DrawnSet::new();
        for &n in drawn {
            set.insert(Ball::new(n).unwrap()).unwrap();
        }
        SessionSnapshot {
            remaining: set.remaining(),
            current: set.last(),
            final_ball: set.last(),
            drawn: set,
            ..SessionSnapshot::default()
        }
    }

    fn texts(tree: &ViewTree<BingoAction>) -> Vec<&str> {
        tree.nodes
            .iter()
            .filter_map(|n| match n {
                ViewNode::Text(t) => Some(t.text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn layout_keeps_parts_on_screen_and_apart() {
        let layout = BingoLayout::compute(SIZE);
        let screen = Rect::from_size(SIZE.width, SIZE.height);
        for r in [
            layout.title,
            layout.ball,
            layout.status,
            layout.draw_button,
            layout.reset_button,
            layout.board_panel,
        ] {
            assert!(r.w > 0 && r.h > 0, "{r:?}");
            assert!(r.right() <= screen.right() && r.bottom() <= screen.bottom(), "{r:?}");
        }
        assert!(layout.ball.right() <= layout.board_panel.x);
        assert!(layout.draw_button.right() <= layout.reset_button.x);
        assert!(layout.title.bottom() <= layout.ball.y);
    }

    #[test]
    fn board_cells_tile_down_each_column() {
        let layout = BingoLayout::compute(SIZE);
        for col in 0..5 {
            let header = layout.header_rect(col);
            let first = layout.cell_rect(col, 0);
            let last = layout.cell_rect(col, COLUMN_LEN as usize - 1);
            assert!(header.bottom() <= first.y);
            assert!(last.bottom() <= layout.board_panel.bottom());
            assert!(first.h > 0 && first.w > 0);
        }
        assert!(layout.cell_rect(0, 0).right() <= layout.cell_rect(1, 0).x);
    }

    #[test]
    fn fresh_view_shows_dashes_and_enabled_draw() {
        let tree = build_view(&SessionSnapshot::default(), SIZE);
        assert!(texts(&tree).contains(&"--"));
        let draw = tree.button(UI_DRAW_BUTTON).unwrap();
        assert_eq!(draw.label, DRAW_LABEL);
        assert!(draw.enabled);
        assert!(tree.button(UI_RESET_BUTTON).unwrap().enabled);
    }

    #[test]
    fn rolling_view_relabels_and_disables_draw() {
        let snapshot = SessionSnapshot {
            phase: RollPhase::Rolling,
            can_draw: false,
            current: Ball::new(3),
            ..SessionSnapshot::default()
        };
        let tree = build_view(&snapshot, SIZE);
        let draw = tree.button(UI_DRAW_BUTTON).unwrap();
        assert_eq!(draw.label, ROLLING_LABEL);
        assert!(!draw.enabled);
        assert!(tree.button(UI_RESET_BUTTON).unwrap().enabled);
    }

    #[test]
    fn ball_shows_letter_above_number() {
        let tree = build_view(&snapshot_with(&[42]), SIZE);
        let node = |s: &str| {
            tree.nodes.iter().find_map(|n| match n {
                ViewNode::Text(t) if t.text == s && t.color == TEXT => Some(t.clone()),
                _ => None,
            })
        };
        let letter = node("N").unwrap();
        let number = node("42").unwrap();
        assert!(letter.center.1 < number.center.1);
        assert!(letter.scale < number.scale);
    }

    #[test]
    fn final_ball_is_larger_with_a_gold_glow() {
        let mut rolling = snapshot_with(&[42]);
        rolling.final_ball = None;
        let plain = build_view(&rolling, SIZE);
        let fin = build_view(&snapshot_with(&[42]), SIZE);

        let discs = |tree: &ViewTree<BingoAction>| -> Vec<DiscNode> {
            tree.nodes
                .iter()
                .filter_map(|n| match n {
                    ViewNode::Disc(d) => Some(d.clone()),
                    _ => None,
                })
                .collect()
        };
        let (p, f) = (discs(&plain), discs(&fin));
        assert_eq!(p[0].color, BALL_RED);
        assert_eq!(f[0].color, GOLD);
        assert!(f[1].radius > p[1].radius);
    }

    #[test]
    fn drawn_cells_are_green_with_dark_text() {
        let tree = build_view(&snapshot_with(&[7, 61]), SIZE);
        let green = tree
            .nodes
            .iter()
            .filter(|n| matches!(n, ViewNode::Rect(r) if r.color == DRAWN))
            .count();
        assert_eq!(green, 2);
        assert!(texts(&tree).contains(&"DRAWN 2/75"));
    }

    #[test]
    fn full_board_disables_draw_but_keeps_its_label() {
        let all: Vec<u8> = (1..=MAX_NUMBER).collect();
        let mut snapshot = snapshot_with(&all);
        snapshot.can_draw = false;
        let tree = build_view(&snapshot, SIZE);
        let draw = tree.button(UI_DRAW_BUTTON).unwrap();
        assert_eq!(draw.label, DRAW_LABEL);
        assert!(!draw.enabled);
    }

    #[test]
    fn fit_scale_respects_both_bounds() {
        assert_eq!(fit_scale("88", 1, 1), 1);
        let s = fit_scale("88", 100, 20);
        assert!(text_width("88", s) <= 100 && text_height(s) <= 20);
        assert!(text_height(s + 1) > 20 || text_width("88", s + 1) > 100);
    }
}
