//! Integer grid coordinates assigned to nodes.

use fxhash::FxHashMap;

use ortho_graph::NodeId;

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Node id to grid point. Setting an already-placed node and touching an
/// unplaced one are invariant violations.
#[derive(Debug, Clone, Default)]
pub struct Positions {
    map: FxHashMap<NodeId, Point>,
}

impl Positions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, node: NodeId, x: i32, y: i32) -> Result<(), Error> {
        if self.map.contains_key(&node) {
            return Err(Error::DuplicatePosition(node));
        }
        self.map.insert(node, Point { x, y });
        Ok(())
    }

    pub fn update(&mut self, node: NodeId, x: i32, y: i32) -> Result<(), Error> {
        let point = self.map.get_mut(&node).ok_or(Error::MissingPosition(node))?;
        *point = Point { x, y };
        Ok(())
    }

    pub fn has(&self, node: NodeId) -> bool {
        self.map.contains_key(&node)
    }

    pub fn point(&self, node: NodeId) -> Result<Point, Error> {
        self.map
            .get(&node)
            .copied()
            .ok_or(Error::MissingPosition(node))
    }

    pub fn x(&self, node: NodeId) -> Result<i32, Error> {
        Ok(self.point(node)?.x)
    }

    pub fn y(&self, node: NodeId) -> Result<i32, Error> {
        Ok(self.point(node)?.y)
    }

    pub fn remove(&mut self, node: NodeId) -> Result<(), Error> {
        self.map
            .remove(&node)
            .map(|_| ())
            .ok_or(Error::MissingPosition(node))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.map.iter().map(|(&node, &point)| (node, point))
    }

    /// Moves every node at `x >= from` one column to the right.
    pub fn shift_right_from(&mut self, from: i32) {
        for point in self.map.values_mut() {
            if point.x >= from {
                point.x += 1;
            }
        }
    }

    /// Moves every node at `x <= upto` one column to the left.
    pub fn shift_left_upto(&mut self, upto: i32) {
        for point in self.map.values_mut() {
            if point.x <= upto {
                point.x -= 1;
            }
        }
    }

    /// Moves every node at `y >= from` one row up.
    pub fn shift_up_from(&mut self, from: i32) {
        for point in self.map.values_mut() {
            if point.y >= from {
                point.y += 1;
            }
        }
    }

    /// Moves every node at `y <= upto` one row down.
    pub fn shift_down_upto(&mut self, upto: i32) {
        for point in self.map.values_mut() {
            if point.y <= upto {
                point.y -= 1;
            }
        }
    }

    /// Translates the layout so the smallest coordinates become zero.
    pub fn normalize(&mut self) {
        let Some(min_x) = self.map.values().map(|point| point.x).min() else {
            return;
        };
        let min_y = self.map.values().map(|point| point.y).min().expect("non-empty");
        for point in self.map.values_mut() {
            point.x -= min_x;
            point.y -= min_y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_is_write_once() {
        let mut positions = Positions::new();
        positions.set(0, 1, 2).unwrap();
        assert!(matches!(
            positions.set(0, 3, 4),
            Err(Error::DuplicatePosition(0))
        ));
        positions.update(0, 3, 4).unwrap();
        assert_eq!(positions.point(0).unwrap(), Point { x: 3, y: 4 });
    }

    #[test]
    fn shifts_move_half_planes() {
        let mut positions = Positions::new();
        positions.set(0, 0, 0).unwrap();
        positions.set(1, 2, 1).unwrap();
        positions.shift_right_from(1);
        assert_eq!(positions.point(0).unwrap(), Point { x: 0, y: 0 });
        assert_eq!(positions.point(1).unwrap(), Point { x: 3, y: 1 });
        positions.shift_down_upto(0);
        assert_eq!(positions.point(0).unwrap(), Point { x: 0, y: -1 });
        assert_eq!(positions.point(1).unwrap(), Point { x: 3, y: 1 });
    }

    #[test]
    fn normalize_translates_to_origin() {
        let mut positions = Positions::new();
        positions.set(0, -2, 5).unwrap();
        positions.set(1, 1, 7).unwrap();
        positions.normalize();
        assert_eq!(positions.point(0).unwrap(), Point { x: 0, y: 0 });
        assert_eq!(positions.point(1).unwrap(), Point { x: 3, y: 2 });
    }
}
