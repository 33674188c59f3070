//! The combinatorial skeleton of a rectilinear drawing: a compass direction
//! for every directed edge, independent of exact coordinates.

use fxhash::FxHashMap;

use ortho_graph::NodeId;

use crate::Error;

/// One of the four compass directions a shape edge can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Clockwise quarter turn.
    pub fn rotated(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn is_horizontal(self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }

    pub fn is_vertical(self) -> bool {
        !self.is_horizontal()
    }

    /// Unit vector of the direction on the grid.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    fn index(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 1,
            Direction::Down => 2,
            Direction::Up => 3,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        };
        f.write_str(name)
    }
}

/// Maps every directed edge to its direction and keeps a per-node index of
/// the neighbor seen in each direction.
///
/// The per-pair map is strict: setting an already-assigned pair fails. The
/// per-node index keeps at most one neighbor per direction, which is exact
/// for nodes of degree at most four; for high-degree nodes the last write
/// wins.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    directions: FxHashMap<(NodeId, NodeId), Direction>,
    neighbor_index: FxHashMap<NodeId, [Option<NodeId>; 4]>,
}

impl Shape {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_direction(
        &mut self,
        from: NodeId,
        to: NodeId,
        direction: Direction,
    ) -> Result<(), Error> {
        if let Some(existing) = self.directions.get(&(from, to)) {
            return Err(Error::ShapeInvariant(format!(
                "direction already set for ({from}, {to}): {existing} vs {direction}"
            )));
        }
        self.directions.insert((from, to), direction);
        self.neighbor_index.entry(from).or_default()[direction.index()] = Some(to);
        Ok(())
    }

    pub fn direction(&self, from: NodeId, to: NodeId) -> Result<Direction, Error> {
        self.directions.get(&(from, to)).copied().ok_or_else(|| {
            Error::ShapeInvariant(format!("no direction set for ({from}, {to})"))
        })
    }

    pub fn contains(&self, from: NodeId, to: NodeId) -> bool {
        self.directions.contains_key(&(from, to))
    }

    pub fn is_horizontal(&self, from: NodeId, to: NodeId) -> Result<bool, Error> {
        Ok(self.direction(from, to)?.is_horizontal())
    }

    pub fn is_vertical(&self, from: NodeId, to: NodeId) -> Result<bool, Error> {
        Ok(self.direction(from, to)?.is_vertical())
    }

    pub fn remove_direction(&mut self, from: NodeId, to: NodeId) -> Result<(), Error> {
        let direction = self.direction(from, to)?;
        self.directions.remove(&(from, to));
        if let Some(index) = self.neighbor_index.get_mut(&from) {
            if index[direction.index()] == Some(to) {
                index[direction.index()] = None;
            }
        }
        Ok(())
    }

    /// Neighbor of `node` in `direction`, if the index has one.
    pub fn neighbor(&self, node: NodeId, direction: Direction) -> Option<NodeId> {
        self.neighbor_index
            .get(&node)
            .and_then(|index| index[direction.index()])
    }

    /// All `(from, to) -> direction` entries, unordered.
    pub fn iter(&self) -> impl Iterator<Item = ((NodeId, NodeId), Direction)> + '_ {
        self.directions.iter().map(|(&pair, &dir)| (pair, dir))
    }

    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_and_rotation() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            assert_eq!(
                direction.rotated().rotated().rotated().rotated(),
                direction
            );
            assert_ne!(direction.rotated().is_horizontal(), direction.is_horizontal());
        }
    }

    #[test]
    fn setting_a_pair_twice_fails() {
        let mut shape = Shape::new();
        shape.set_direction(0, 1, Direction::Up).unwrap();
        assert!(shape.set_direction(0, 1, Direction::Up).is_err());
    }

    #[test]
    fn neighbor_index_follows_directions() {
        let mut shape = Shape::new();
        shape.set_direction(0, 1, Direction::Right).unwrap();
        shape.set_direction(1, 0, Direction::Left).unwrap();
        shape.set_direction(0, 2, Direction::Up).unwrap();

        assert_eq!(shape.neighbor(0, Direction::Right), Some(1));
        assert_eq!(shape.neighbor(0, Direction::Up), Some(2));
        assert_eq!(shape.neighbor(0, Direction::Down), None);

        shape.remove_direction(0, 2).unwrap();
        assert_eq!(shape.neighbor(0, Direction::Up), None);
        assert!(!shape.contains(0, 2));
    }
}
