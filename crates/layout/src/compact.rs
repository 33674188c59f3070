//! Sliding-interval compaction.
//!
//! Per axis, every coordinate class owns an interval on the other axis
//! spanned by its members. Walking the coordinates from 1 upward, each
//! class slides toward the origin for as long as the previous coordinate
//! holds no class with an overlapping interval. Sliding past a class the
//! edge relation orders it behind is impossible, because such classes
//! share a row or column and therefore conflict.

use log::debug;

use ortho_graph::Graph;

use crate::classes::build_equivalence_classes;
use crate::positions::Positions;
use crate::shape::Shape;
use crate::Error;

#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
}

/// Compacts the x axis; y coordinates are left untouched.
pub fn compact_x(
    graph: &Graph,
    shape: &Shape,
    positions: &Positions,
) -> Result<Positions, Error> {
    compact(graph, shape, positions, Axis::X)
}

/// Compacts the y axis; x coordinates are left untouched.
pub fn compact_y(
    graph: &Graph,
    shape: &Shape,
    positions: &Positions,
) -> Result<Positions, Error> {
    compact(graph, shape, positions, Axis::Y)
}

fn compact(
    graph: &Graph,
    shape: &Shape,
    old: &Positions,
    axis: Axis,
) -> Result<Positions, Error> {
    let (classes_x, classes_y) = build_equivalence_classes(shape, graph)?;
    let classes = match axis {
        Axis::X => classes_x,
        Axis::Y => classes_y,
    };
    let class_count = classes.class_count();

    let mut coordinate = vec![0_i32; class_count];
    let mut interval = vec![(i32::MAX, i32::MIN); class_count];
    for class in 0..class_count {
        let members = classes.members(class)?;
        let mut shared: Option<i32> = None;
        for &node in members {
            let point = old.point(node)?;
            let (own, other) = match axis {
                Axis::X => (point.x, point.y),
                Axis::Y => (point.y, point.x),
            };
            match shared {
                None => shared = Some(own),
                Some(existing) if existing != own => {
                    return Err(Error::ShapeInvariant(format!(
                        "class {class} spans two coordinates ({existing} and {own})"
                    )))
                }
                Some(_) => {}
            }
            interval[class].0 = interval[class].0.min(other);
            interval[class].1 = interval[class].1.max(other);
        }
        let own = shared.ok_or_else(|| {
            Error::ShapeInvariant(format!("class {class} has no members"))
        })?;
        if own < 0 {
            return Err(Error::ShapeInvariant(format!(
                "compaction expects non-negative coordinates, class {class} is at {own}"
            )));
        }
        coordinate[class] = own;
    }

    let max_coordinate = coordinate.iter().copied().max().unwrap_or(0);
    let mut at_coordinate: Vec<Vec<usize>> = vec![Vec::new(); max_coordinate as usize + 1];
    for class in 0..class_count {
        at_coordinate[coordinate[class] as usize].push(class);
    }

    let overlaps = |a: (i32, i32), b: (i32, i32)| a.0 <= b.1 && b.0 <= a.1;
    let mut moved = 0_usize;
    for walked in 1..=max_coordinate {
        let snapshot = at_coordinate[walked as usize].clone();
        for class in snapshot {
            let mut current = coordinate[class];
            while current > 0 {
                let blocked = at_coordinate[current as usize - 1]
                    .iter()
                    .any(|&other| overlaps(interval[class], interval[other]));
                if blocked {
                    break;
                }
                at_coordinate[current as usize].retain(|&other| other != class);
                at_coordinate[current as usize - 1].push(class);
                current -= 1;
            }
            if current != coordinate[class] {
                moved += 1;
                coordinate[class] = current;
            }
        }
    }
    debug!("compaction moved {moved} classes");

    let mut fresh = Positions::new();
    for class in 0..class_count {
        for &node in classes.members(class)? {
            let point = old.point(node)?;
            match axis {
                Axis::X => fresh.set(node, coordinate[class], point.y)?,
                Axis::Y => fresh.set(node, point.x, coordinate[class])?,
            }
        }
    }
    Ok(fresh)
}
