use chrono::{DateTime, Duration, Local};
use isoalloc_core::{IsolationLevel, ProgramInstance, StaticOperation, TemplateSet};
use rand::distr::uniform::Error as UniformError;
use rand::distr::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngExt, SeedableRng};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize, TypedBuilder)]
pub struct WorkloadParams {
    /// Number of templates, named `Txn_1..Txn_n`.
    pub n_template: u64,
    /// Upper bound on operations per template; each gets `1..=max_ops`.
    pub max_ops: u64,
    /// Size of the key space `key_1..key_{max_key}`.
    pub max_key: u64,
    /// Share of read-only templates, in percent.
    #[builder(default)]
    pub read_only_percent: u64,
    #[builder(default = 1)]
    pub case_num: u64,
    /// Seed for reproducible output; mixed with `case_num`.
    #[builder(default)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl WorkloadParams {
    /// `workload_{n}t_{ops}o_{keys}k_{ro}r_{case}.json`
    #[must_use]
    pub fn file_name(&self) -> String {
        format!(
            "workload_{}t_{}o_{}k_{}r_{}.json",
            self.n_template, self.max_ops, self.max_key, self.read_only_percent, self.case_num
        )
    }

    /// Inverse of [`file_name`](Self::file_name). Any directory part of
    /// `file_name` must already be stripped; the seed is not recoverable.
    #[must_use]
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let stem = file_name
            .strip_prefix("workload_")?
            .strip_suffix(".json")?;
        let mut parts = stem.split('_');
        let mut field = |suffix: &str| -> Option<u64> {
            let part = parts.next()?;
            part.strip_suffix(suffix).unwrap_or(part).parse().ok()
        };
        let params = Self {
            n_template: field("t")?,
            max_ops: field("o")?,
            max_key: field("k")?,
            read_only_percent: field("r")?,
            case_num: field("")?,
            seed: None,
        };
        parts.next().is_none().then_some(params)
    }

    #[must_use]
    pub fn with_case(&self, case_num: u64) -> Self {
        Self {
            case_num,
            ..self.clone()
        }
    }
}

/// A generated workload. Serializes as the template set itself with the
/// generation metadata alongside, so the file reads back as a plain
/// [`TemplateSet`].
#[derive(Deserialize, Serialize, Debug)]
pub struct Workload {
    params: WorkloadParams,
    start: DateTime<Local>,
    end: DateTime<Local>,
    #[serde(flatten)]
    templates: TemplateSet,
}

impl Workload {
    #[must_use]
    pub const fn new(
        params: WorkloadParams,
        start: DateTime<Local>,
        end: DateTime<Local>,
        templates: TemplateSet,
    ) -> Self {
        Self {
            params,
            start,
            end,
            templates,
        }
    }

    #[must_use]
    pub const fn get_params(&self) -> &WorkloadParams {
        &self.params
    }

    #[must_use]
    pub const fn get_templates(&self) -> &TemplateSet {
        &self.templates
    }

    #[must_use]
    pub fn into_templates(self) -> TemplateSet {
        self.templates
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        self.params.file_name()
    }

    #[must_use]
    pub fn get_duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Generate one workload of `n_template` templates declared SERIALIZABLE,
/// in shuffled order.
///
/// Read-only templates draw `1..=max_ops` reads; the others pick READ or
/// WRITE uniformly per operation. Keys are drawn uniformly from
/// `key_1..=key_{max_key}`, so a template may touch a key more than once.
///
/// # Errors
///
/// Returns an error if `max_ops` or `max_key` is zero.
pub fn generate_single_workload(params: &WorkloadParams) -> Result<TemplateSet, UniformError> {
    match params.seed {
        Some(seed) => generate_with(
            params,
            &mut StdRng::seed_from_u64(seed.wrapping_add(params.case_num)),
        ),
        None => generate_with(params, &mut rand::rng()),
    }
}

fn generate_with<R: Rng + ?Sized>(
    params: &WorkloadParams,
    random_generator: &mut R,
) -> Result<TemplateSet, UniformError> {
    let op_count_range = Uniform::new_inclusive(1, params.max_ops)?;
    let key_range = Uniform::new_inclusive(1, params.max_key)?;
    let percent_range = Uniform::new_inclusive(1, 100)?;

    let mut templates: Vec<ProgramInstance> = (1..=params.n_template)
        .map(|txn_id| {
            let read_only = percent_range.sample(random_generator) <= params.read_only_percent;
            let n_ops = op_count_range.sample(random_generator);
            let operations = (1..=n_ops)
                .map(|op_id| {
                    let key = format!("key_{}", key_range.sample(random_generator));
                    if read_only || random_generator.random::<bool>() {
                        StaticOperation::read(op_id, key)
                    } else {
                        StaticOperation::write(op_id, key)
                    }
                })
                .collect();
            ProgramInstance::new(
                format!("Txn_{txn_id}"),
                Some(IsolationLevel::Serializable),
                operations,
            )
        })
        .collect();

    templates.shuffle(random_generator);

    Ok(templates.into())
}

/// Generate cases `1..=n_case` of `params` in parallel.
///
/// # Errors
///
/// Returns an error if `max_ops` or `max_key` is zero.
pub fn generate_mult_workloads(
    n_case: u64,
    params: &WorkloadParams,
) -> Result<Vec<Workload>, UniformError> {
    (1..=n_case)
        .into_par_iter()
        .map(|case_num| {
            let params = params.with_case(case_num);
            let start_time = Local::now();
            let templates = generate_single_workload(&params)?;
            let end_time = Local::now();
            Ok(Workload::new(params, start_time, end_time, templates))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use isoalloc_core::allocate_and_verify;

    use super::*;

    fn params() -> WorkloadParams {
        WorkloadParams::builder()
            .n_template(40)
            .max_ops(6)
            .max_key(25)
            .read_only_percent(30)
            .build()
    }

    #[test]
    fn test_file_name() {
        let params = params().with_case(7);
        assert_eq!(params.file_name(), "workload_40t_6o_25k_30r_7.json");
        assert_eq!(
            WorkloadParams::from_file_name(&params.file_name()),
            Some(params)
        );
    }

    #[test]
    fn test_malformed_file_names() {
        for name in [
            "workload_40t_6o_25k_30r.json",
            "workload_40t_6o_25k_30r_7_8.json",
            "workload_40t_6o_25k_30r_x.json",
            "workload_40t_6o_25k_30r_7.txt",
            "SmallBank-1.json",
        ] {
            assert_eq!(WorkloadParams::from_file_name(name), None, "{name}");
        }
    }

    #[test]
    fn test_shape() {
        let set = generate_single_workload(&params()).unwrap();
        assert_eq!(set.len(), 40);

        let mut names: Vec<_> = set.templates().iter().map(ProgramInstance::name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 40);

        for template in set.templates() {
            assert!(template.is_ser());
            assert!((1..=6).contains(&template.operations().len()));
            for (op, id) in template.operations().iter().zip(1..) {
                assert_eq!(op.id, id);
                let n: u64 = op.key.strip_prefix("key_").unwrap().parse().unwrap();
                assert!((1..=25).contains(&n));
            }
        }
    }

    #[test]
    fn test_read_only_percent_bounds() {
        let all = generate_single_workload(&params().with_read_only(100)).unwrap();
        assert!(all.templates().iter().all(ProgramInstance::is_read_only));

        let none = generate_single_workload(&params().with_read_only(0)).unwrap();
        assert!(none
            .templates()
            .iter()
            .flat_map(ProgramInstance::operations)
            .all(|op| op.is_read() != op.is_write()));
    }

    #[test]
    fn test_seed_is_reproducible() {
        let seeded = WorkloadParams {
            seed: Some(42),
            ..params()
        };
        assert_eq!(
            generate_single_workload(&seeded).unwrap(),
            generate_single_workload(&seeded).unwrap()
        );
        assert_ne!(
            generate_single_workload(&seeded).unwrap(),
            generate_single_workload(&seeded.with_case(2)).unwrap()
        );
    }

    #[test]
    fn test_zero_bounds_are_rejected() {
        let zero_ops = WorkloadParams {
            max_ops: 0,
            ..params()
        };
        assert!(generate_single_workload(&zero_ops).is_err());
        assert!(generate_mult_workloads(3, &zero_ops).is_err());
    }

    #[test]
    fn test_mult_workloads() {
        let workloads = generate_mult_workloads(4, &params()).unwrap();
        let cases: Vec<_> = workloads.iter().map(|w| w.get_params().case_num).collect();
        assert_eq!(cases, vec![1, 2, 3, 4]);
        for workload in &workloads {
            assert!(workload.get_duration() >= Duration::zero());
            assert_eq!(workload.get_templates().len(), 40);
        }
    }

    #[test]
    fn test_allocation_of_generated_workloads_is_never_critical() {
        for workload in generate_mult_workloads(8, &params()).unwrap() {
            let (_, cycle) = allocate_and_verify(workload.get_templates()).unwrap();
            assert_eq!(cycle, None, "in {}", workload.file_name());
        }
    }

    #[test]
    fn test_workload_file_reads_back_as_template_set() {
        let workload = generate_mult_workloads(1, &params())
            .unwrap()
            .pop()
            .unwrap();
        let json = serde_json::to_string(&workload).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["templates"].is_array());
        assert_eq!(value["params"]["case_num"], 1);

        let set: TemplateSet = serde_json::from_str(&json).unwrap();
        assert_eq!(&set, workload.get_templates());

        let back: Workload = serde_json::from_str(&json).unwrap();
        assert_eq!(back.get_params(), workload.get_params());
    }

    impl WorkloadParams {
        fn with_read_only(&self, read_only_percent: u64) -> Self {
            Self {
                read_only_percent,
                ..self.clone()
            }
        }
    }
}
