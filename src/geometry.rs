use std::fmt;
use std::ops::{Add, Sub};

/// Physical coordinate in the GDS render plane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        let x_diff = self.x - other.x;
        let y_diff = self.y - other.y;
        (x_diff.powi(2) + y_diff.powi(2)).sqrt()
    }

    pub fn distance_sqrd(&self, other: &Point) -> f64 {
        let x_diff = self.x - other.x;
        let y_diff = self.y - other.y;
        x_diff.powi(2) + y_diff.powi(2)
    }

    /// Total ordering usable as a sort key. Coordinates coming out of the
    /// routing math are never NaN.
    pub fn sort_key(&self) -> (OrderedF64, OrderedF64) {
        (OrderedF64(self.x), OrderedF64(self.y))
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, other: Point) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, other: Point) -> Point {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl rstar::Point for Point {
    type Scalar = f64;
    const DIMENSIONS: usize = 2;

    fn generate(mut generator: impl FnMut(usize) -> Self::Scalar) -> Self {
        Point {
            x: generator(0),
            y: generator(1),
        }
    }

    fn nth(&self, index: usize) -> Self::Scalar {
        match index {
            0 => self.x,
            1 => self.y,
            _ => panic!("index out of bounds"),
        }
    }

    fn nth_mut(&mut self, index: usize) -> &mut Self::Scalar {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            _ => panic!("index out of bounds"),
        }
    }
}

/// f64 wrapper ordered with `total_cmp` so sorts are fully specified.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderedF64(pub f64);

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Axis-aligned rectangle given by two opposite corners.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub start: Point,
    pub end: Point,
}

impl Rect {
    pub fn new(start: Point, end: Point) -> Self {
        Rect { start, end }
    }

    pub fn width(&self) -> f64 {
        self.end.x - self.start.x
    }

    pub fn height(&self) -> f64 {
        self.end.y - self.start.y
    }

    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.start.x
            && point.x <= self.end.x
            && point.y >= self.start.y
            && point.y <= self.end.y
    }
}

pub trait BoundingBox {
    fn bounding_box(&self) -> Rect;
}

/// Bounding box over a polygon outline. Returns `None` for an empty outline.
pub fn outline_bounding_box(outline: &[Point]) -> Option<Rect> {
    let first = outline.first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;
    for p in &outline[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }
    Some(Rect::new(Point::new(min_x, min_y), Point::new(max_x, max_y)))
}

/// One of the four chip edges pins can be assigned to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum ChipEdge {
    Upper,
    Lower,
    Left,
    Right,
}

impl ChipEdge {
    pub const ALL: [ChipEdge; 4] = [
        ChipEdge::Upper,
        ChipEdge::Lower,
        ChipEdge::Left,
        ChipEdge::Right,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ChipEdge::Upper => "upper",
            ChipEdge::Lower => "lower",
            ChipEdge::Left => "left",
            ChipEdge::Right => "right",
        }
    }

    /// Direction the pin's trace exits toward the chip interior, in degrees.
    pub fn orientation(&self) -> u16 {
        match self {
            ChipEdge::Upper => 0,
            ChipEdge::Lower => 180,
            ChipEdge::Left => 90,
            ChipEdge::Right => 270,
        }
    }

    pub fn is_horizontal(&self) -> bool {
        matches!(self, ChipEdge::Upper | ChipEdge::Lower)
    }
}

impl fmt::Display for ChipEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
