//! Shape geometry, the Tokenizer, and the CodelGrid adapter.

use std::collections::{BTreeMap, VecDeque};

use crate::exits::{Cc, Dp, Position};
use crate::ops::Col;

pub type ShapeId = usize;

/// A maximal 4-connected region of same-colored codels, with a balanced
/// sorted edge index supporting O(log n) extrema queries.
#[derive(Debug, Clone)]
pub struct Shape {
    pub color: Col,
    pub size: u32,
    /// X → (minY, maxY) across every member codel with that X.
    x_edges: BTreeMap<i64, (i64, i64)>,
    /// Y → (minX, maxX) across every member codel with that Y.
    y_edges: BTreeMap<i64, (i64, i64)>,
}

impl Shape {
    fn new(color: Col) -> Self {
        Self {
            color,
            size: 0,
            x_edges: BTreeMap::new(),
            y_edges: BTreeMap::new(),
        }
    }

    fn add_point(&mut self, x: i64, y: i64) {
        self.size += 1;
        Self::extend(&mut self.x_edges, x, y);
        Self::extend(&mut self.y_edges, y, x);
    }

    fn extend(edges: &mut BTreeMap<i64, (i64, i64)>, key: i64, value: i64) {
        edges
            .entry(key)
            .and_modify(|(min, max)| {
                if value < *min {
                    *min = value;
                }
                if value > *max {
                    *max = value;
                }
            })
            .or_insert((value, value));
    }

    pub fn x_edge(&self, x: i64) -> Option<(i64, i64)> {
        self.x_edges.get(&x).copied()
    }

    pub fn y_edge(&self, y: i64) -> Option<(i64, i64)> {
        self.y_edges.get(&y).copied()
    }

    pub fn min_x_node(&self) -> Option<(i64, (i64, i64))> {
        self.x_edges.iter().next().map(|(&k, &v)| (k, v))
    }

    pub fn max_x_node(&self) -> Option<(i64, (i64, i64))> {
        self.x_edges.iter().next_back().map(|(&k, &v)| (k, v))
    }

    pub fn min_y_node(&self) -> Option<(i64, (i64, i64))> {
        self.y_edges.iter().next().map(|(&k, &v)| (k, v))
    }

    pub fn max_y_node(&self) -> Option<(i64, (i64, i64))> {
        self.y_edges.iter().next_back().map(|(&k, &v)| (k, v))
    }

    /// The exit codel for direction `dp` and chooser `cc`,
    /// expressed in this shape's own coordinates (no bounds/obstacle check —
    /// that is the Navigator's job).
    pub fn exit_codel(&self, dp: Dp, cc: Cc) -> Option<(i64, i64)> {
        match dp {
            Dp::Right => {
                let (key, (min, max)) = self.max_x_node()?;
                let y = if cc == Cc::Left { min } else { max };
                Some((key, y))
            }
            Dp::Down => {
                let (key, (min, max)) = self.max_y_node()?;
                let x = if cc == Cc::Left { max } else { min };
                Some((x, key))
            }
            Dp::Left => {
                let (key, (min, max)) = self.min_x_node()?;
                let y = if cc == Cc::Left { max } else { min };
                Some((key, y))
            }
            Dp::Up => {
                let (key, (min, max)) = self.min_y_node()?;
                let x = if cc == Cc::Left { min } else { max };
                Some((x, key))
            }
        }
    }
}

/// A dense width × height array of shape indices plus the append-only owning
/// vector of shapes. Built once by `tokenize`, then read-only.
#[derive(Debug, Clone)]
pub struct ShapeTable {
    width: usize,
    height: usize,
    colors: Vec<Col>,
    indices: Vec<i64>,
    shapes: Vec<Shape>,
}

impl ShapeTable {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn shape(&self, id: ShapeId) -> &Shape {
        &self.shapes[id]
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn color_at(&self, pos: Position) -> Option<Col> {
        if self.in_bounds(pos) {
            Some(self.colors[pos.y * self.width + pos.x])
        } else {
            None
        }
    }

    pub fn shape_id_at(&self, pos: Position) -> Option<ShapeId> {
        if self.in_bounds(pos) {
            let idx = self.indices[pos.y * self.width + pos.x];
            debug_assert!(idx >= 0, "every codel must be tokenized");
            Some(idx as usize)
        } else {
            None
        }
    }

    /// Flood-fill the grid into maximal same-color shapes.
    /// Scans column-major, and each flood fill uses an explicit FIFO queue
    /// rather than recursion so a single monochrome region spanning the
    /// whole image cannot exhaust the call stack.
    pub fn tokenize(width: usize, height: usize, colors: Vec<Col>) -> Self {
        assert_eq!(colors.len(), width * height);

        let mut table = ShapeTable {
            width,
            height,
            colors,
            indices: vec![-1; width * height],
            shapes: Vec::new(),
        };

        for x in 0..width {
            for y in 0..height {
                let idx = y * width + x;
                if table.indices[idx] != -1 {
                    continue;
                }

                let color = table.colors[idx];
                let shape_id = table.shapes.len();
                let mut shape = Shape::new(color);

                let mut queue = VecDeque::new();
                queue.push_back(Position::new(x, y));
                table.indices[idx] = shape_id as i64;

                while let Some(pos) = queue.pop_front() {
                    shape.add_point(pos.x as i64, pos.y as i64);

                    for dir in [Dp::Right, Dp::Down, Dp::Left, Dp::Up] {
                        if let Some(next) = pos.step(dir, width, height) {
                            let next_idx = next.y * width + next.x;
                            if table.indices[next_idx] == -1 && table.colors[next_idx] == color {
                                table.indices[next_idx] = shape_id as i64;
                                queue.push_back(next);
                            }
                        }
                    }
                }

                table.shapes.push(shape);
            }
        }

        log::debug!(
            "tokenized {}x{} grid into {} shapes",
            width,
            height,
            table.shapes.len()
        );
        table
    }
}

/// Downscale a raw RGBA buffer by `codel_size` and map each sampled pixel to
/// a `Col`. Purely in-memory: decoding the source file into
/// this RGBA buffer is `canvas_codec`'s job, not this crate's.
pub fn codel_grid_from_rgba(
    width: usize,
    height: usize,
    rgba: &[u8],
    codel_size: usize,
) -> (usize, usize, Vec<Col>) {
    assert_eq!(rgba.len(), width * height * 4);
    let codel_size = codel_size.max(1);

    let out_width = width / codel_size;
    let out_height = height / codel_size;

    let mut colors = Vec::with_capacity(out_width * out_height);
    for cy in 0..out_height {
        for cx in 0..out_width {
            let (px, py) = (cx * codel_size, cy * codel_size);
            let idx = (py * width + px) * 4;
            colors.push(Col::from_rgb(rgba[idx], rgba[idx + 1], rgba[idx + 2]));
        }
    }

    (out_width, out_height, colors)
}

/// Detect a uniform codel size by finding the GCD of same-color run lengths
/// along a handful of scanlines, falling back to 1 when detection is
/// inconclusive. A convenience for callers whose source image was rendered
/// at a magnified codel size; not required by the CLI contract, which
/// defaults `--codel-size` to 1, but useful enough to keep.
pub fn detect_codel_size(width: usize, height: usize, rgba: &[u8]) -> usize {
    if rgba.len() != width * height * 4 || width == 0 || height == 0 {
        return 1;
    }
    let get_pixel = |x: usize, y: usize| -> (u8, u8, u8) {
        let idx = (y * width + x) * 4;
        (rgba[idx], rgba[idx + 1], rgba[idx + 2])
    };

    let mut run_lengths = Vec::new();
    for &row in &[0, height / 2, height.saturating_sub(1)] {
        if row >= height {
            continue;
        }
        let mut x = 0;
        while x < width {
            let color = get_pixel(x, row);
            let mut run = 1;
            while x + run < width && get_pixel(x + run, row) == color {
                run += 1;
            }
            run_lengths.push(run);
            x += run;
        }
    }
    for &col in &[0, width / 2, width.saturating_sub(1)] {
        if col >= width {
            continue;
        }
        let mut y = 0;
        while y < height {
            let color = get_pixel(col, y);
            let mut run = 1;
            while y + run < height && get_pixel(col, y + run) == color {
                run += 1;
            }
            run_lengths.push(run);
            y += run;
        }
    }

    run_lengths.into_iter().fold(0, gcd).max(1)
}

fn gcd(a: usize, b: usize) -> usize {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}
