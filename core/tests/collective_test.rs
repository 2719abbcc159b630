use halo_life::distributed::{Channel, Collective, launch};

/// Shard `i` contributes `[i*k, i*k+1, ..., i*k+k-1]`; every shard must end up with
/// `[0, 1, ..., N*k-1]`.
fn check_all_gather(world_size: usize, k: usize) {
    let results = launch::<i32, _, _>(world_size, |comm| {
        let base = (comm.rank() * k) as i32;
        let send: Vec<i32> = (0..k as i32).map(|j| base + j).collect();
        let mut recv = vec![-1; world_size * k];
        comm.all_gather(&send, &mut recv)?;
        Ok(recv)
    })
    .unwrap();

    let expected: Vec<i32> = (0..(world_size * k) as i32).collect();
    for (rank, recv) in results.iter().enumerate() {
        assert_eq!(recv, &expected, "N={world_size} k={k} rank {rank}");
    }
}

#[test]
fn test_all_gather_round_trip() {
    for world_size in [1, 3, 8] {
        for k in [1, 32, 1024, 1 << 16] {
            check_all_gather(world_size, k);
        }
    }
}

#[test]
fn test_all_gather_repeated() {
    // Back-to-back collectives between the same shards must not mix up their messages.
    let results = launch::<u64, _, _>(4, |comm| {
        let mut rounds = Vec::new();
        for round in 0..5u64 {
            let mut recv = [0u64; 4];
            comm.all_gather(&[round * 100 + comm.rank() as u64], &mut recv)?;
            rounds.push(recv);
        }
        Ok(rounds)
    })
    .unwrap();

    for rounds in &results {
        for (round, recv) in rounds.iter().enumerate() {
            let base = round as u64 * 100;
            assert_eq!(recv, &[base, base + 1, base + 2, base + 3]);
        }
    }
}

#[test]
fn test_gather_every_root() {
    let world_size = 5;
    for root in 0..world_size {
        let results = launch::<u8, _, _>(world_size, |comm| {
            comm.gather(&[comm.rank() as u8, 0xff], root)
        })
        .unwrap();

        for (rank, gathered) in results.into_iter().enumerate() {
            if rank == root {
                let expected: Vec<u8> = (0..world_size as u8).flat_map(|r| [r, 0xff]).collect();
                assert_eq!(gathered, Some(expected));
            } else {
                assert_eq!(gathered, None);
            }
        }
    }
}

#[test]
fn test_broadcast_large_buffer() {
    let len = 1 << 18;
    let results = launch::<u32, _, _>(3, |comm| {
        let mut buf = if comm.rank() == 0 {
            (0..len as u32).collect()
        } else {
            vec![0u32; len]
        };
        comm.broadcast(&mut buf, 0)?;
        Ok(buf.iter().map(|&v| v as u64).sum::<u64>())
    })
    .unwrap();

    let expected = (len as u64 - 1) * len as u64 / 2;
    assert!(results.iter().all(|&sum| sum == expected));
}

#[test]
fn test_collectives_interleave_with_point_to_point() {
    let results = launch::<i64, _, _>(3, |comm| {
        let right = (comm.rank() + 1) % 3;
        let left = (comm.rank() + 2) % 3;
        comm.send(&[comm.rank() as i64], Some(right), 0)?;

        let mut recv = [0i64; 3];
        comm.all_gather(&[10 * comm.rank() as i64], &mut recv)?;

        let mut from_left = [0i64];
        comm.recv(&mut from_left, Some(left), 0)?;
        Ok((recv, from_left[0]))
    })
    .unwrap();

    for (rank, (recv, from_left)) in results.iter().enumerate() {
        assert_eq!(recv, &[0, 10, 20]);
        assert_eq!(*from_left, ((rank + 2) % 3) as i64);
    }
}
