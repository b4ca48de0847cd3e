use std::time::Instant;

use Direction::*;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// The neighbouring cell in `direction`. No grid bounds are applied;
    /// coordinates saturate at the ends of `i32`.
    pub fn step(self, direction: Direction) -> Point {
        let (dx, dy) = direction.delta();
        Point::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Up => (0, -1),
            Down => (0, 1),
            Left => (-1, 0),
            Right => (1, 0),
        }
    }
}

/// Index 0 is the oldest retained segment, the last index the newest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snake {
    body: Vec<Point>,
}

impl Snake {
    pub fn new(body: Vec<Point>) -> Self {
        Snake { body }
    }

    pub fn body(&self) -> &[Point] {
        &self.body
    }

    /// The cell the next segment is computed from.
    pub fn reference_cell(&self) -> Option<Point> {
        self.body.last().copied()
    }

    /// Appends `reference + delta(direction)`, dropping the oldest segment
    /// unless `keep_oldest` is set. Returns the appended cell.
    pub fn shift(&mut self, direction: Direction, keep_oldest: bool) -> Option<Point> {
        let new_cell = self.reference_cell()?.step(direction);

        if !keep_oldest {
            self.body.remove(0);
        }
        self.body.push(new_cell);

        Some(new_cell)
    }
}

/// The single mutable value shared by the movement and render threads.
#[derive(Debug, Clone)]
pub struct GameState {
    pub snake: Snake,
    pub direction: Direction,
    pub food: Option<Point>,
    pub last_food_placement: Instant,
}

impl GameState {
    pub fn new(snake: Snake, direction: Direction, food: Option<Point>, now: Instant) -> Self {
        GameState { snake, direction, food, last_food_placement: now }
    }

    /// The starting position of every run.
    pub fn initial(now: Instant) -> Self {
        let body = vec![
            Point::new(10, 10),
            Point::new(10, 11),
            Point::new(10, 12),
            Point::new(11, 12),
            Point::new(12, 12),
        ];
        GameState::new(Snake::new(body), Right, Some(Point::new(5, 5)), now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pts(cells: &[(i32, i32)]) -> Vec<Point> {
        cells.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn step_applies_direction_delta_without_clamping() {
        let origin = Point::new(0, 0);
        assert_eq!(origin.step(Up), Point::new(0, -1));
        assert_eq!(origin.step(Down), Point::new(0, 1));
        assert_eq!(origin.step(Left), Point::new(-1, 0));
        assert_eq!(origin.step(Right), Point::new(1, 0));
    }

    #[test]
    fn step_saturates_far_off_grid() {
        assert_eq!(Point::new(i32::MAX, 0).step(Right), Point::new(i32::MAX, 0));
        assert_eq!(Point::new(0, i32::MIN).step(Up), Point::new(0, i32::MIN));
    }

    #[test]
    fn shift_moves_from_last_element_and_drops_first() {
        let mut snake = Snake::new(pts(&[(10, 10), (10, 11), (10, 12), (11, 12), (12, 12)]));

        let appended = snake.shift(Right, false);

        assert_eq!(appended, Some(Point::new(13, 12)));
        assert_eq!(snake.body(), &pts(&[(10, 11), (10, 12), (11, 12), (12, 12), (13, 12)])[..]);
    }

    #[test]
    fn shift_allows_reversal_into_body() {
        let mut snake = Snake::new(pts(&[(1, 1), (2, 1), (3, 1)]));

        snake.shift(Left, false);

        assert_eq!(snake.body(), &pts(&[(2, 1), (3, 1), (2, 1)])[..]);
    }

    #[test]
    fn shift_of_single_segment_uses_it_as_reference() {
        let mut snake = Snake::new(pts(&[(4, 4)]));

        snake.shift(Down, false);

        assert_eq!(snake.body(), &pts(&[(4, 5)])[..]);
    }

    #[test]
    fn shift_keeping_oldest_grows_by_one() {
        let mut snake = Snake::new(pts(&[(0, 0), (1, 0)]));

        snake.shift(Right, true);

        assert_eq!(snake.body(), &pts(&[(0, 0), (1, 0), (2, 0)])[..]);
    }

    #[test]
    fn shift_of_empty_body_is_a_no_op() {
        let mut snake = Snake::new(vec![]);
        assert_eq!(snake.shift(Up, false), None);
        assert!(snake.body().is_empty());
    }

    #[test]
    fn initial_state() {
        let state = GameState::initial(Instant::now());
        assert_eq!(state.snake.body().len(), 5);
        assert_eq!(state.direction, Right);
        assert_eq!(state.food, Some(Point::new(5, 5)));
    }
}
