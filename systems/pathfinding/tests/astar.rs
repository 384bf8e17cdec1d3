use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tilewalk_core::{CellCoord, WalkabilityGrid};
use tilewalk_system_pathfinding::{find_path, Pathfinder};

fn assert_valid_path(
    grid: &WalkabilityGrid,
    path: &[CellCoord],
    source: CellCoord,
    destination: CellCoord,
) {
    assert_eq!(path.first(), Some(&source));
    assert_eq!(path.last(), Some(&destination));
    for pair in path.windows(2) {
        assert_eq!(pair[0].manhattan_distance(pair[1]), 1, "non-adjacent step {pair:?}");
    }
    for cell in path.iter().skip(1) {
        assert!(grid.is_walkable(*cell), "path crosses blocked cell {cell:?}");
    }
}

fn breadth_first_distance(
    grid: &WalkabilityGrid,
    source: CellCoord,
    destination: CellCoord,
) -> Option<u32> {
    let (columns, rows) = grid.dimensions();
    let width = usize::try_from(columns).expect("width fits");
    let index = |cell: CellCoord| {
        usize::try_from(cell.row()).expect("row fits") * width
            + usize::try_from(cell.column()).expect("column fits")
    };
    let mut distances = vec![None; width * usize::try_from(rows).expect("rows fit")];
    let mut queue = VecDeque::new();
    distances[index(source)] = Some(0_u32);
    queue.push_back(source);

    while let Some(cell) = queue.pop_front() {
        let distance = distances[index(cell)].expect("queued cells have distances");
        if cell == destination {
            return Some(distance);
        }
        for (dc, dr) in [(0, -1), (-1, 0), (1, 0), (0, 1)] {
            let Some(next) = cell.offset(dc, dr) else {
                continue;
            };
            if !grid.is_walkable(next) || distances[index(next)].is_some() {
                continue;
            }
            distances[index(next)] = Some(distance + 1);
            queue.push_back(next);
        }
    }

    None
}

fn random_grid(rng: &mut ChaCha8Rng, columns: u32, rows: u32, density: f64) -> WalkabilityGrid {
    let mut grid = WalkabilityGrid::open(columns, rows);
    for row in 0..rows {
        for column in 0..columns {
            if rng.gen_bool(density) {
                grid.block(CellCoord::new(column, row));
            }
        }
    }
    grid
}

#[test]
fn open_grid_corner_to_corner_visits_nine_cells() {
    let grid = WalkabilityGrid::open(5, 5);
    let source = CellCoord::new(0, 0);
    let destination = CellCoord::new(4, 4);

    let path = find_path(&grid, source, destination);

    assert_eq!(path.len(), 9);
    assert_valid_path(&grid, &path, source, destination);
    assert!(path[1] == CellCoord::new(1, 0) || path[1] == CellCoord::new(0, 1));
}

#[test]
fn single_obstacle_forces_a_detour() {
    let mut grid = WalkabilityGrid::open(5, 5);
    grid.block(CellCoord::new(2, 2));
    let source = CellCoord::new(0, 2);
    let destination = CellCoord::new(4, 2);

    let path = find_path(&grid, source, destination);

    assert_eq!(path.len(), 7);
    assert_valid_path(&grid, &path, source, destination);
    assert!(!path.contains(&CellCoord::new(2, 2)));
}

#[test]
fn blocked_destination_yields_no_path() {
    let mut grid = WalkabilityGrid::open(5, 5);
    grid.block(CellCoord::new(4, 4));
    assert!(find_path(&grid, CellCoord::new(0, 0), CellCoord::new(4, 4)).is_empty());
}

#[test]
fn enclosed_destination_yields_no_path() {
    let mut grid = WalkabilityGrid::open(5, 5);
    for cell in [
        CellCoord::new(3, 2),
        CellCoord::new(2, 3),
        CellCoord::new(4, 3),
        CellCoord::new(3, 4),
    ] {
        grid.block(cell);
    }
    assert!(grid.is_walkable(CellCoord::new(3, 3)));
    assert!(find_path(&grid, CellCoord::new(0, 0), CellCoord::new(3, 3)).is_empty());
}

#[test]
fn blocked_source_still_expands() {
    let mut grid = WalkabilityGrid::open(3, 1);
    grid.block(CellCoord::new(0, 0));
    let path = find_path(&grid, CellCoord::new(0, 0), CellCoord::new(2, 0));
    assert_eq!(
        path,
        vec![CellCoord::new(0, 0), CellCoord::new(1, 0), CellCoord::new(2, 0)]
    );
}

#[test]
fn source_equal_to_destination_is_a_single_node() {
    let grid = WalkabilityGrid::open(3, 3);
    assert_eq!(
        find_path(&grid, CellCoord::new(1, 1), CellCoord::new(1, 1)),
        vec![CellCoord::new(1, 1)]
    );
}

#[test]
fn source_outside_the_grid_yields_no_path() {
    let grid = WalkabilityGrid::open(3, 3);
    assert!(find_path(&grid, CellCoord::new(3, 0), CellCoord::new(1, 1)).is_empty());
}

#[test]
fn path_lengths_match_breadth_first_search() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x0a57_a5ea_4c11_0001);
    let mut pathfinder = Pathfinder::default();

    for _ in 0..200 {
        let columns = rng.gen_range(2..=9);
        let rows = rng.gen_range(2..=9);
        let grid = random_grid(&mut rng, columns, rows, 0.3);
        let source = CellCoord::new(rng.gen_range(0..columns), rng.gen_range(0..rows));
        let destination = CellCoord::new(rng.gen_range(0..columns), rng.gen_range(0..rows));
        if !grid.is_walkable(source) {
            continue;
        }

        let path = pathfinder.find_path(&grid, source, destination);
        match breadth_first_distance(&grid, source, destination) {
            Some(distance) => {
                let expected = usize::try_from(distance).expect("distance fits") + 1;
                assert_eq!(path.len(), expected, "suboptimal path on {grid:?}");
                assert_valid_path(&grid, &path, source, destination);
            }
            None => assert!(path.is_empty(), "path found through walls on {grid:?}"),
        }
    }
}

#[test]
fn identical_queries_produce_identical_paths() {
    let mut rng = ChaCha8Rng::seed_from_u64(0xde7e_2a11_0000_0002);
    let grid = random_grid(&mut rng, 12, 12, 0.2);
    let source = CellCoord::new(0, 0);
    let destination = CellCoord::new(11, 11);

    let baseline = find_path(&grid, source, destination);
    let mut pathfinder = Pathfinder::default();
    for _ in 0..10 {
        assert_eq!(pathfinder.find_path(&grid, source, destination), baseline);
    }
}
