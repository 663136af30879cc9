use crate::types::{Dims, PlacedItem};

const MAX_WIDTH: f64 = 80.0;
const MAX_HEIGHT: f64 = 40.0;

/// Top-down ASCII view of the horizontal slice at height `z`: every box whose
/// vertical span contains `z` is drawn over the container floor.
pub fn render_layer(container: Dims, placed: &[PlacedItem], z: u32) -> String {
    if container.length == 0 || container.width == 0 {
        return String::new();
    }
    let scale = f64::min(
        MAX_WIDTH / container.length as f64,
        MAX_HEIGHT / container.width as f64,
    );
    let grid_w = (container.length as f64 * scale).round() as usize;
    let grid_h = (container.width as f64 * scale).round() as usize;

    if grid_w == 0 || grid_h == 0 {
        return String::new();
    }

    let mut grid = vec![vec![' '; grid_w + 1]; grid_h + 1];

    draw_rect(&mut grid, 0, 0, grid_w, grid_h);

    for p in placed.iter().filter(|p| in_layer(p, z)) {
        let sx = (p.pos.x as f64 * scale).round() as usize;
        let sy = (p.pos.y as f64 * scale).round() as usize;
        let sw = (p.dims.length as f64 * scale).round() as usize;
        let sh = (p.dims.width as f64 * scale).round() as usize;

        if sw == 0 || sh == 0 {
            continue;
        }

        draw_rect(&mut grid, sx, sy, sw, sh);

        let label = format!("{}x{}", p.dims.length, p.dims.width);
        let label_chars: Vec<char> = label.chars().collect();

        if sw > 2 {
            let cx = sx + sw / 2;
            let cy = sy + sh / 2;
            let start_x = cx.saturating_sub(label_chars.len() / 2);

            for (i, &ch) in label_chars.iter().enumerate() {
                let x = start_x + i;
                if x > sx && x < sx + sw && cy > sy && cy < sy + sh {
                    grid[cy][x] = ch;
                }
            }
        }
    }

    let mut result = String::new();
    for row in &grid {
        let line: String = row.iter().collect();
        result.push_str(line.trim_end());
        result.push('\n');
    }
    result
}

/// Distinct heights at which some box starts, lowest first.
pub fn layer_heights(placed: &[PlacedItem]) -> Vec<u32> {
    let mut zs: Vec<u32> = placed.iter().map(|p| p.pos.z).collect();
    zs.sort_unstable();
    zs.dedup();
    zs
}

fn in_layer(p: &PlacedItem, z: u32) -> bool {
    let bottom = p.pos.z as u64;
    bottom <= z as u64 && (z as u64) < bottom + p.dims.height as u64
}

/// Draws `line` ('-' or '|') into a cell, turning crossings into '+'.
fn mark(cell: &mut char, line: char) {
    let crossing = if line == '-' { '|' } else { '-' };
    *cell = if *cell == crossing || *cell == '+' {
        '+'
    } else {
        line
    };
}

fn draw_rect(grid: &mut [Vec<char>], x: usize, y: usize, w: usize, h: usize) {
    let rows = grid.len();
    let cols = match grid.first() {
        Some(row) => row.len(),
        None => return,
    };

    for i in x..=x + w {
        if i >= cols {
            continue;
        }
        for j in [y, y + h] {
            if j < rows {
                mark(&mut grid[j][i], '-');
            }
        }
    }

    for j in y..=y + h {
        if j >= rows {
            continue;
        }
        for i in [x, x + w] {
            if i < cols {
                mark(&mut grid[j][i], '|');
            }
        }
    }

    for cx in [x, x + w] {
        for cy in [y, y + h] {
            if cy < rows && cx < cols {
                grid[cy][cx] = '+';
            }
        }
    }
}
