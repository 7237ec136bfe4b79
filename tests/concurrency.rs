use std::{error::Error, sync::Arc};

use rayon::prelude::*;
use zarrs_dataset::{
    chunked_dataset::{append_record, create_chunked_dataset, read_record, record_count, RecordCapacity},
    group::Group,
    storage::store::MemoryStore,
    unique_dataset::{read_unique_dataset_at, write_unique_dataset_at},
    DatasetError,
};

#[test]
fn concurrent_independent_datasets() -> Result<(), Box<dyn Error>> {
    let root = Group::root(Arc::new(MemoryStore::new()));
    let group = root.open_or_create_group("parallel")?;

    (0..16u32).into_par_iter().try_for_each(|i| {
        let dataset = create_chunked_dataset::<[u32; 4], _>(
            &group,
            &format!("records_{i}"),
            &(),
            RecordCapacity::Unlimited,
        )?;
        for j in 0..8 {
            append_record(&dataset, &[i, j, i * j, i + j])?;
        }
        write_unique_dataset_at(&group, &format!("unique_{i}"), &vec![i; 100]).map(|_| ())
    })?;

    (0..16u32).into_par_iter().try_for_each(|i| {
        let dataset = group.open_dataset(&format!("records_{i}"))?;
        assert_eq!(record_count(&dataset)?, 8);
        let mut record = [0u32; 4];
        for j in 0..8 {
            read_record(&dataset, &mut record, i64::from(j))?;
            assert_eq!(record, [i, j, i * j, i + j]);
        }
        let mut values = Vec::<u32>::new();
        read_unique_dataset_at(&group, &format!("unique_{i}"), &mut values)?;
        assert_eq!(values, vec![i; 100]);
        Ok::<_, DatasetError>(())
    })?;
    Ok(())
}
