use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 10;

/// Axis-aligned square given by its minimum corner and side.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct Square {
    pub(super) min: Vec2,
    pub(super) side: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        // A unit of margin on each side keeps boundary points strictly inside.
        let side = (max - min).max_elem().max(1.0) + 2.0;
        Some(Self {
            min: (min + max) * 0.5 - Vec2::splat(side * 0.5),
            side,
        })
    }

    fn max(self) -> Vec2 {
        self.min + Vec2::splat(self.side)
    }

    pub(super) fn center(self) -> Vec2 {
        self.min + Vec2::splat(self.side * 0.5)
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let local = point - self.min;
        (0.0..=self.side).contains(&local.x) && (0.0..=self.side).contains(&local.y)
    }

    /// Bit 0 is the right half, bit 1 the lower half.
    fn quadrant(self, point: Vec2) -> usize {
        let mid = self.center();
        usize::from(point.x >= mid.x) | (usize::from(point.y >= mid.y) << 1)
    }

    fn quadrant_square(self, quadrant: usize) -> Self {
        let half = self.side * 0.5;
        Self {
            min: self.min + vec2((quadrant & 1) as f32, (quadrant >> 1) as f32) * half,
            side: half,
        }
    }

    /// Squared gap between two squares, zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let low = self.min.max(other.min);
        let high = self.max().min(other.max());
        (low - high).max(Vec2::ZERO).length_sq()
    }
}

/// Barnes–Hut cell. Leaves own point indices; interior cells only carry the
/// aggregate mass and centre of mass of their occupied children.
pub(super) struct QuadNode {
    pub(super) square: Square,
    pub(super) mass: f32,
    pub(super) center_of_mass: Vec2,
    pub(super) indices: Vec<usize>,
    children: Vec<QuadNode>,
}

/// Cell geometry for the debug overlay.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadtreeCell {
    pub center: Vec2,
    pub half_extent: f32,
    pub depth: usize,
    pub is_leaf: bool,
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let square = Square::enclosing(positions)?;
        let mut indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::subdivide(square, &mut indices, positions, 0))
    }

    fn subdivide(square: Square, indices: &mut [usize], positions: &[Vec2], depth: usize) -> Self {
        let first = positions[indices[0]];
        let coincident = indices.iter().all(|&index| positions[index] == first);
        if depth >= MAX_DEPTH || indices.len() <= LEAF_CAPACITY || coincident {
            return Self::leaf(square, indices, positions);
        }

        indices.sort_unstable_by_key(|&index| square.quadrant(positions[index]));
        let children = indices
            .chunk_by_mut(|&a, &b| square.quadrant(positions[a]) == square.quadrant(positions[b]))
            .map(|group| {
                let quadrant = square.quadrant(positions[group[0]]);
                Self::subdivide(square.quadrant_square(quadrant), group, positions, depth + 1)
            })
            .collect::<Vec<_>>();

        let mass = children.iter().map(|child| child.mass).sum::<f32>();
        let weighted = children
            .iter()
            .fold(Vec2::ZERO, |sum, child| sum + child.center_of_mass * child.mass);
        Self {
            square,
            mass,
            center_of_mass: weighted / mass,
            indices: Vec::new(),
            children,
        }
    }

    fn leaf(square: Square, indices: &[usize], positions: &[Vec2]) -> Self {
        let mass = indices.len() as f32;
        let sum = indices
            .iter()
            .fold(Vec2::ZERO, |sum, &index| sum + positions[index]);
        Self {
            square,
            mass,
            center_of_mass: sum / mass,
            indices: indices.to_vec(),
            children: Vec::new(),
        }
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub(super) fn children(&self) -> &[QuadNode] {
        &self.children
    }
}

pub(super) fn collect_quadtree_cells(node: &QuadNode, depth: usize, cells: &mut Vec<QuadtreeCell>) {
    cells.push(QuadtreeCell {
        center: node.square.center(),
        half_extent: node.square.side * 0.5,
        depth,
        is_leaf: node.is_leaf(),
    });
    for child in node.children() {
        collect_quadtree_cells(child, depth + 1, cells);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn grid(count: usize) -> Vec<Vec2> {
        (0..count)
            .map(|index| vec2((index % 7) as f32 * 30.0, (index / 7) as f32 * 25.0))
            .collect()
    }

    fn leaves<'a>(node: &'a QuadNode, out: &mut Vec<&'a QuadNode>) {
        if node.is_leaf() {
            out.push(node);
        }
        for child in node.children() {
            leaves(child, out);
        }
    }

    #[test]
    fn leaves_partition_every_point() {
        let positions = grid(40);
        let tree = QuadNode::build(&positions).expect("finite points");

        let mut found = Vec::new();
        leaves(&tree, &mut found);
        let mut seen = found
            .iter()
            .flat_map(|leaf| leaf.indices.iter().copied())
            .collect::<Vec<_>>();
        seen.sort_unstable();
        assert_eq!(seen, (0..40).collect::<Vec<_>>());
        assert_eq!(tree.mass, 40.0);
        assert!(!tree.is_leaf());
    }

    #[test]
    fn every_leaf_square_holds_its_points() {
        let positions = grid(60);
        let tree = QuadNode::build(&positions).expect("finite points");

        let mut found = Vec::new();
        leaves(&tree, &mut found);
        for leaf in found {
            for &index in &leaf.indices {
                assert!(leaf.square.contains(positions[index]));
            }
        }
    }

    #[test]
    fn root_center_of_mass_is_the_mean() {
        let positions = grid(33);
        let tree = QuadNode::build(&positions).expect("finite points");
        let mean = positions.iter().fold(Vec2::ZERO, |sum, p| sum + *p) / 33.0;
        assert_relative_eq!(tree.center_of_mass.x, mean.x, epsilon = 1e-3);
        assert_relative_eq!(tree.center_of_mass.y, mean.y, epsilon = 1e-3);
    }

    #[test]
    fn non_finite_points_build_nothing() {
        assert!(QuadNode::build(&[vec2(f32::NAN, 0.0)]).is_none());
        assert!(QuadNode::build(&[]).is_none());
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(5.0, 5.0); 20];
        let tree = QuadNode::build(&positions).expect("finite points");
        assert!(tree.is_leaf());
        assert_eq!(tree.indices.len(), 20);
    }

    #[test]
    fn gap_is_zero_for_touching_squares() {
        let a = Square { min: vec2(0.0, 0.0), side: 10.0 };
        let b = Square { min: vec2(10.0, 0.0), side: 5.0 };
        let c = Square { min: vec2(13.0, 14.0), side: 1.0 };
        assert_eq!(a.gap_sq(b), 0.0);
        assert_eq!(a.gap_sq(c), 9.0 + 16.0);
    }

    #[test]
    fn cell_listing_includes_root() {
        let positions = vec![vec2(0.0, 0.0), vec2(100.0, 100.0)];
        let tree = QuadNode::build(&positions).expect("finite points");
        let mut cells = Vec::new();
        collect_quadtree_cells(&tree, 0, &mut cells);
        assert_eq!(cells[0].depth, 0);
        assert!(cells[0].is_leaf);
        assert_relative_eq!(cells[0].center.x, 50.0);
    }
}
