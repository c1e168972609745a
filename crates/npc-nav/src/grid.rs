use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::Path;

use npc_core::Vec3;

use crate::{NavError, NavPath, Pathfinder};

const WALL: char = 'x';

/// Neighbour offsets, visited in this order: -Y, +X, +Y, -X.
const STEPS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Grid of navigation nodes on the XZ plane.
///
/// Node `(x, y)` sits at world `(x * node_size, 0, y * node_size)`. World
/// positions map to the nearest node; the height axis is ignored.
#[derive(Debug, Clone)]
pub struct NavGrid {
    width: i32,
    height: i32,
    node_size: f32,
    walls: Vec<bool>,
}

impl NavGrid {
    /// Panics when either dimension is zero or exceeds `i32::MAX`.
    pub fn new(width: u32, height: u32, node_size: f32) -> Self {
        let (Ok(w), Ok(h)) = (i32::try_from(width), i32::try_from(height)) else {
            panic!("grid dimensions {width}x{height} exceed i32::MAX");
        };
        assert!(w > 0 && h > 0, "grid must have at least one node");
        assert!(node_size > 0.0, "node_size must be > 0");
        Self {
            width: w,
            height: h,
            node_size,
            walls: vec![false; width as usize * height as usize],
        }
    }

    /// Parse the maze text layout: a `node_size width height` header followed
    /// by `width * height` cell characters, row by row. `'x'` marks a wall;
    /// any other character is walkable. Whitespace between cells is ignored.
    pub fn parse(src: &str) -> Result<Self, NavError> {
        let mut tokens = src.split_whitespace();
        let node_size = header_field(tokens.next(), "node_size")?;
        let width = header_field(tokens.next(), "width")?;
        let height = header_field(tokens.next(), "height")?;

        let expected = width as usize * height as usize;
        let cells: Vec<char> = tokens.flat_map(str::chars).take(expected).collect();
        if cells.len() < expected {
            return Err(NavError::Truncated {
                expected,
                found: cells.len(),
            });
        }

        let mut grid = NavGrid::new(width, height, node_size as f32);
        grid.walls = cells.into_iter().map(|c| c == WALL).collect();
        Ok(grid)
    }

    pub fn load(path: &Path) -> Result<Self, NavError> {
        let src = std::fs::read_to_string(path).map_err(|source| NavError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let grid = Self::parse(&src)?;
        tracing::debug!(
            path = %path.display(),
            width = grid.width,
            height = grid.height,
            "loaded nav grid"
        );
        Ok(grid)
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    pub fn node_size(&self) -> f32 {
        self.node_size
    }

    pub fn set_blocked(&mut self, x: i32, y: i32, blocked: bool) {
        if let Some(index) = self.index_of(x, y) {
            self.walls[index] = blocked;
        }
    }

    /// Out-of-bounds cells count as blocked.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        self.index_of(x, y).map_or(true, |index| self.walls[index])
    }

    /// World position of node `(x, y)`.
    pub fn node_position(&self, x: i32, y: i32) -> Vec3 {
        Vec3::new(x as f32 * self.node_size, 0.0, y as f32 * self.node_size)
    }

    fn index_of(&self, x: i32, y: i32) -> Option<usize> {
        let inside = (0..self.width).contains(&x) && (0..self.height).contains(&y);
        inside.then(|| (y * self.width + x) as usize)
    }

    fn coords(&self, index: usize) -> (i32, i32) {
        let index = index as i32;
        (index % self.width, index / self.width)
    }

    fn snap(&self, position: Vec3) -> Option<usize> {
        let x = (position.x / self.node_size).round() as i32;
        let y = (position.z / self.node_size).round() as i32;
        self.index_of(x, y)
    }

    fn manhattan(&self, a: usize, b: usize) -> u32 {
        let (ax, ay) = self.coords(a);
        let (bx, by) = self.coords(b);
        ax.abs_diff(bx) + ay.abs_diff(by)
    }

    fn open_neighbours(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        let (x, y) = self.coords(index);
        STEPS
            .iter()
            .filter_map(move |&(dx, dy)| self.index_of(x + dx, y + dy))
            .filter(|&next| !self.walls[next])
    }

    /// A* over cell indices. Returns the cells from `start` to `goal`
    /// inclusive. Frontier ties are broken by insertion order, so the same
    /// grid and endpoints always yield the same route.
    fn search(&self, start: usize, goal: usize) -> Option<Vec<usize>> {
        if self.walls[start] || self.walls[goal] {
            return None;
        }

        let mut cost = vec![u32::MAX; self.walls.len()];
        let mut parent: Vec<Option<usize>> = vec![None; self.walls.len()];
        let mut frontier = BinaryHeap::new();
        let mut seq: u64 = 0;

        cost[start] = 0;
        frontier.push(Reverse((self.manhattan(start, goal), seq, 0u32, start)));

        while let Some(Reverse((_, _, steps, current))) = frontier.pop() {
            if current == goal {
                let mut route: Vec<usize> =
                    std::iter::successors(Some(goal), |&cell| parent[cell]).collect();
                route.reverse();
                return Some(route);
            }
            if steps > cost[current] {
                continue;
            }

            for next in self.open_neighbours(current) {
                let reached = steps + 1;
                if reached >= cost[next] {
                    continue;
                }
                cost[next] = reached;
                parent[next] = Some(current);
                seq += 1;
                frontier.push(Reverse((
                    reached + self.manhattan(next, goal),
                    seq,
                    reached,
                    next,
                )));
            }
        }

        None
    }
}

fn header_field(token: Option<&str>, field: &'static str) -> Result<u32, NavError> {
    let token = token.ok_or(NavError::MissingHeader(field))?;
    match token.parse::<u32>() {
        Ok(value) if value > 0 && i32::try_from(value).is_ok() => Ok(value),
        _ => Err(NavError::InvalidHeader {
            field,
            value: token.to_string(),
        }),
    }
}

impl Pathfinder for NavGrid {
    fn find_path(&self, start: Vec3, end: Vec3) -> Option<NavPath> {
        let from = self.snap(start)?;
        let to = self.snap(end)?;
        let route = self.search(from, to)?;
        Some(NavPath::new(route.into_iter().map(|index| {
            let (x, y) = self.coords(index);
            self.node_position(x, y)
        })))
    }
}
