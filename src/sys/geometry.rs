//! Plain geometry types shared by the model and the scene.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self { Point { x, y } }
}

impl Size {
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    pub const fn new(width: f64, height: f64) -> Self { Size { width, height } }

    pub fn scale(&self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

impl Rect {
    pub const fn new(origin: Point, size: Size) -> Self { Rect { origin, size } }

    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect::new(Point::new(x, y), Size::new(width, height))
    }

    pub fn min(&self) -> Point { self.origin }

    pub fn max(&self) -> Point {
        Point::new(self.origin.x + self.size.width, self.origin.y + self.size.height)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        let max = self.max();
        point.x >= self.origin.x && point.x < max.x && point.y >= self.origin.y && point.y < max.y
    }
}

pub trait Round {
    fn round(&self) -> Self;
}

impl Round for Rect {
    fn round(&self) -> Self {
        let min_rounded = self.min().round();
        let max_rounded = self.max().round();
        Rect {
            origin: min_rounded,
            size: Size {
                width: max_rounded.x - min_rounded.x,
                height: max_rounded.y - min_rounded.y,
            },
        }
    }
}

impl Round for Point {
    fn round(&self) -> Self { Point { x: self.x.round(), y: self.y.round() } }
}

impl Round for Size {
    fn round(&self) -> Self {
        Size {
            width: self.width.round(),
            height: self.height.round(),
        }
    }
}

pub trait IsWithin {
    fn is_within(&self, how_much: f64, other: Self) -> bool;
}

impl IsWithin for Rect {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.origin.is_within(how_much, other.origin) && self.size.is_within(how_much, other.size)
    }
}

impl IsWithin for Point {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.x.is_within(how_much, other.x) && self.y.is_within(how_much, other.y)
    }
}

impl IsWithin for Size {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.width.is_within(how_much, other.width) && self.height.is_within(how_much, other.height)
    }
}

impl IsWithin for f64 {
    fn is_within(&self, how_much: f64, other: Self) -> bool { (self - other).abs() < how_much }
}

pub trait SameAs: IsWithin + Sized {
    fn same_as(&self, other: Self) -> bool { self.is_within(0.1, other) }
}

impl SameAs for Rect {}
impl SameAs for Point {}
impl SameAs for Size {}
impl SameAs for f64 {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_rect() {
        let rect = Rect::from_xywh(10.4, 20.7, 100.0, 200.0);
        let rounded = rect.round();
        assert_eq!(rounded.origin.x, 10.0);
        assert_eq!(rounded.origin.y, 21.0);
        assert_eq!(rounded.size.width, 100.0);
        assert_eq!(rounded.size.height, 200.0);
    }

    #[test]
    fn test_round_size() {
        let rounded = Size::new(100.6, 200.3).round();
        assert_eq!(rounded, Size::new(101.0, 200.0));
    }

    #[test]
    fn test_center_and_contains() {
        let rect = Rect::from_xywh(100.0, 50.0, 200.0, 100.0);
        assert_eq!(rect.center(), Point::new(200.0, 100.0));
        assert!(rect.contains(Point::new(100.0, 50.0)));
        assert!(!rect.contains(Point::new(300.0, 100.0)));
        assert!(!rect.contains(Point::new(99.0, 60.0)));
    }

    #[test]
    fn test_same_as() {
        let a = Rect::from_xywh(10.0, 20.0, 100.0, 200.0);
        let b = Rect::from_xywh(10.05, 20.05, 100.05, 200.05);
        assert!(a.same_as(b));
        assert!(!a.same_as(Rect::from_xywh(11.0, 20.0, 100.0, 200.0)));
    }
}
