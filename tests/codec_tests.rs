//! Integration tests for the mesh codec: write a stream, read it back.

use geocache::core::{locate, TimeSampling};
use geocache::geom::{
    index_values, EncodePolicy, Face, MeshReader, MeshSnapshot, MeshWriter, UvSet,
};
use geocache::util::{BBox3d, DVec3, Vec2, Vec3, INVALID_POINT};
use smallvec::smallvec;

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "geocache=debug".to_string());
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Unit cube, six quads with mixed starting corners.
fn cube(offset: DVec3) -> MeshSnapshot {
    let corners = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
    ];
    let faces: Vec<Face> = vec![
        smallvec![0, 3, 2, 1],
        smallvec![4, 5, 6, 7],
        smallvec![0, 1, 5, 4],
        smallvec![2, 3, 7, 6],
        smallvec![1, 2, 6, 5],
        smallvec![3, 0, 4, 7],
    ];
    let positions = corners.iter().map(|&c| DVec3::from_array(c) + offset).collect();
    let uvs = (0..24).map(|i| Vec2::new((i % 4) as f32 * 0.25, (i / 4) as f32 * 0.125)).collect();
    let normals = faces
        .iter()
        .enumerate()
        .flat_map(|(f, face)| {
            let n = [Vec3::NEG_Z, Vec3::Z, Vec3::NEG_Y, Vec3::Y, Vec3::X, Vec3::NEG_X][f];
            std::iter::repeat(n).take(face.len())
        })
        .collect();

    MeshSnapshot::new(positions, faces)
        .with_normals(normals)
        .with_uv_set(UvSet::new("map1", uvs))
        .with_face_group("top", vec![1])
}

fn write(ts: TimeSampling, policy: EncodePolicy, frames: &[MeshSnapshot]) -> geocache::geom::GeometrySampleSequence {
    let mut writer = MeshWriter::new(ts, policy);
    for frame in frames {
        writer.write(frame).unwrap();
    }
    writer.finish()
}

fn assert_close(a: &[Vec3], b: &[Vec3]) {
    assert_eq!(a.len(), b.len());
    for (x, y) in a.iter().zip(b) {
        assert!((*x - *y).length() < 1e-5, "{:?} != {:?}", x, y);
    }
}

#[test]
fn test_round_trip_at_sample_time() {
    init_tracing();
    let src = cube(DVec3::ZERO);
    let stream = write(TimeSampling::uniform(1.0, 0.0), EncodePolicy::default(), &[src.clone()]);
    let reader = MeshReader::new(&stream);

    let expected: Vec<Vec3> = src.positions.iter().map(|p| p.as_vec3()).collect();
    assert_eq!(reader.positions_at(0.0), expected);
    assert_eq!(reader.topology_at(0.0).unwrap(), src.faces);
    assert_eq!(reader.uvs_at(0.0, 0).unwrap(), src.uv_sets[0].values);
    assert_eq!(reader.normals_at(0.0).unwrap(), src.normals.clone().unwrap());

    let side = stream.side_properties();
    assert_eq!(side.uv_set_names, vec!["map1".to_string()]);
    assert_eq!(side.face_set("top").unwrap().faces, vec![1]);
}

#[test]
fn test_round_trip_unindexed() {
    init_tracing();
    let src = cube(DVec3::ZERO);
    let policy = EncodePolicy::default().with_normals(true, false).with_uvs(true, false);
    let stream = write(TimeSampling::uniform(1.0, 0.0), policy, &[src.clone()]);
    let reader = MeshReader::new(&stream);
    assert!(!stream.get(0).unwrap().uvs.as_ref().unwrap().is_indexed());
    assert_eq!(reader.uvs_at(0.0, 0).unwrap(), src.uv_sets[0].values);
}

#[test]
fn test_locator_boundaries() {
    let ts = TimeSampling::uniform(1.0 / 24.0, 0.0);
    let before = ts.locate(-1.0, 3);
    assert_eq!((before.floor_index, before.ceil_index, before.alpha), (0, 0, 0.0));
    let after = ts.locate(100.0, 3);
    assert_eq!((after.floor_index, after.ceil_index, after.alpha), (2, 2, 0.0));
    let mid = ts.locate(1.5 / 24.0, 3);
    assert_eq!((mid.floor_index, mid.ceil_index), (1, 2));
    assert!((mid.alpha - 0.5).abs() < 1e-9);

    let exact = locate(2.0, &[0.0, 1.0, 2.0, 3.0], 4);
    assert!(exact.is_exact());
    assert_eq!(exact.floor_index, 2);
    assert!(locate(5.0, &[0.0], 1).is_exact());
}

#[test]
fn test_interpolation_midpoint() {
    init_tracing();
    let a = cube(DVec3::ZERO);
    let b = cube(DVec3::new(2.0, 0.0, -4.0));
    let stream = write(TimeSampling::uniform(1.0, 0.0), EncodePolicy::default(), &[a.clone(), b]);
    let reader = MeshReader::new(&stream);

    let expected: Vec<Vec3> = a
        .positions
        .iter()
        .map(|p| (*p + DVec3::new(1.0, 0.0, -2.0)).as_vec3())
        .collect();
    assert_close(&reader.positions_at(0.5), &expected);

    // Topology comes from the first sample for every query time.
    assert_eq!(reader.topology_at(0.5).unwrap(), a.faces);

    let bounds = reader.bounds_at(0.5);
    assert_eq!(bounds.min, DVec3::new(1.0, 0.0, -2.0));
    assert_eq!(bounds.max, DVec3::new(2.0, 1.0, -1.0));
}

#[test]
fn test_velocity_fallback() {
    init_tracing();
    let tri = MeshSnapshot::new(
        vec![DVec3::ZERO, DVec3::X, DVec3::Y],
        vec![smallvec![0, 1, 2]],
    )
    .with_velocities(vec![Vec3::X; 3]);
    let quad = MeshSnapshot::new(
        vec![DVec3::ZERO, DVec3::X, DVec3::ONE, DVec3::Y],
        vec![smallvec![0, 1, 2, 3]],
    )
    .with_velocities(vec![Vec3::ZERO; 4]);

    let policy = EncodePolicy::default().with_dynamic_topology(true).with_velocities(true);
    let stream = write(TimeSampling::uniform(2.0, 0.0), policy, &[tri, quad.clone()]);
    let reader = MeshReader::new(&stream);

    // Halfway across a 2s span: one second of motion.
    assert_close(
        &reader.positions_at(1.0),
        &[Vec3::X, Vec3::new(2.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 0.0)],
    );
    assert_eq!(reader.topology_at(1.0).unwrap().len(), 1);
    assert_eq!(reader.topology_at(2.0).unwrap(), quad.faces);
}

#[test]
fn test_empty_mesh_sentinel() {
    init_tracing();
    let stream = write(TimeSampling::IDENTITY, EncodePolicy::default(), &[MeshSnapshot::default()]);
    let reader = MeshReader::new(&stream);
    assert_eq!(reader.positions_at(0.0), vec![INVALID_POINT]);
    assert_eq!(reader.bounds_at(0.0), BBox3d::from_point(DVec3::ZERO));
    // Degenerate topology without velocities: no valid faces.
    assert_eq!(reader.topology_at(0.0), None);

    let policy = EncodePolicy::default().with_dynamic_topology(true).with_velocities(true);
    let empty = MeshSnapshot::default().with_velocities(vec![]);
    let stream = write(TimeSampling::IDENTITY, policy, &[empty]);
    let faces = MeshReader::new(&stream).topology_at(0.0).unwrap();
    assert_eq!(faces, vec![Face::from_slice(&[0, 0, 0])]);
}

#[test]
fn test_bounds_grow_monotonically() {
    let points = [
        DVec3::new(3.0, -1.0, 0.5),
        DVec3::new(-2.0, 4.0, 1.0),
        DVec3::new(0.0, 0.0, -7.0),
        DVec3::new(1.0, 1.0, 1.0),
    ];
    let mut acc = BBox3d::EMPTY;
    let mut prev = acc;
    for &p in &points {
        acc.expand_by_point(p);
        assert!(prev.is_empty() || (acc.min.cmple(prev.min).all() && acc.max.cmpge(prev.max).all()));
        prev = acc;
    }
    assert_eq!(acc, BBox3d::from_points(points.iter().rev().copied()));
    assert_eq!(acc.min, DVec3::new(-2.0, -1.0, -7.0));
    assert_eq!(acc.max, DVec3::new(3.0, 4.0, 1.0));
}

#[test]
fn test_indexing_dedup_and_idempotence() {
    let input = vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, 0.0),
    ];
    let first = index_values(&input);
    assert_eq!(first.values.len(), 3);
    for (i, &idx) in first.indices.iter().enumerate() {
        assert_eq!(first.values[idx as usize], input[i]);
    }

    let again = index_values(&first.values);
    assert_eq!(again.values, first.values);
    assert_eq!(again.indices, vec![0, 1, 2]);
}

#[test]
fn test_dynamic_topology_read_back() {
    init_tracing();
    let tri = MeshSnapshot::new(
        vec![DVec3::ZERO, DVec3::X, DVec3::Y],
        vec![smallvec![0, 1, 2]],
    )
    .with_normals(vec![Vec3::Z; 3])
    .with_uv_set(UvSet::new("map1", vec![Vec2::ZERO, Vec2::X, Vec2::Y]));

    let uvs: Vec<Vec2> = (0..7).map(|i| Vec2::new(i as f32 * 0.125, 1.0)).collect();
    let quad_tri = MeshSnapshot::new(
        vec![DVec3::ZERO, DVec3::X, DVec3::ONE, DVec3::Y, DVec3::Z],
        vec![smallvec![0, 1, 2, 3], smallvec![0, 3, 4]],
    )
    .with_normals(vec![Vec3::X, Vec3::X, Vec3::Y, Vec3::Y, Vec3::Z, Vec3::X, Vec3::Y])
    .with_uv_set(UvSet::new("map1", uvs.clone()));

    let policy = EncodePolicy::default().with_dynamic_topology(true);
    let mut writer = MeshWriter::new(TimeSampling::uniform(1.0, 0.0), policy);
    writer.write(&tri).unwrap();
    let first = *writer.signature().unwrap();
    writer.write(&quad_tri).unwrap();
    let second = *writer.signature().unwrap();
    assert_ne!(first.digest, second.digest);
    assert_eq!((first.num_faces, second.num_faces), (1, 2));
    assert_eq!((first.num_indices, second.num_indices), (3, 7));

    let stream = writer.finish();
    let reader = MeshReader::new(&stream);

    assert_eq!(reader.topology_at(0.0).unwrap(), tri.faces);
    assert_eq!(reader.normals_at(0.0).unwrap(), tri.normals.clone().unwrap());
    assert_eq!(reader.uvs_at(0.0, 0).unwrap(), tri.uv_sets[0].values);

    assert_eq!(reader.topology_at(1.0).unwrap(), quad_tri.faces);
    assert_eq!(reader.normals_at(1.0).unwrap(), quad_tri.normals.clone().unwrap());
    assert_eq!(reader.uvs_at(1.0, 0).unwrap(), uvs);

    // Occurrence counts differ between the frames: the floor is kept as is.
    assert_eq!(reader.normals_at(0.5).unwrap(), tri.normals.unwrap());
    assert_eq!(reader.uvs_at(0.5, 0).unwrap(), tri.uv_sets[0].values);
}
