use std::{collections::HashMap, fs::File, path::Path, time::Instant};

use indexmap::IndexMap;
use ndarray::Array2;
use rand::{SeedableRng, rngs::StdRng};
use tokenizers::Tokenizer;

use super::{ForwardStats, MultiTaskOutput, Prediction, predictions};
use crate::{
    Error, VERSION,
    config::{ConfigError, DEFAULT_PRETRAINED_MODEL_NAME, MultiTaskModelConfig, TaskHeadConfig},
    encoder::{PooledEmbeddingEncoder, SentenceEncoder},
    head::TaskHead,
    parameters::{ParameterLoader, ParameterTree, write_named_arrays},
};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const TOKENIZER_FILE_NAME: &str = "tokenizer.json";
pub const PARAMETERS_FILE_NAME: &str = "model.safetensors";

const HEADS_PREFIX: &str = "heads";

/// One shared encoder feeding any number of independent task heads.
///
/// `forward` runs the encoder once per batch and hands a view of the same
/// representation to every head, so adding a task costs one head projection
/// and nothing on the encoder side.
pub struct MultiTaskModel<E: SentenceEncoder> {
    encoder: E,
    heads: IndexMap<String, TaskHead>,
    pretrained_model_name: String,
    seed: u64,
}

impl<E: SentenceEncoder> MultiTaskModel<E> {
    /// Builds freshly initialized heads sized to the encoder's hidden size.
    pub fn new(
        encoder: E,
        tasks: &[TaskHeadConfig],
        seed: u64,
    ) -> Result<Self, Error> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut model = Self::with_rng(encoder, tasks, &mut rng)?;
        model.seed = seed;
        Ok(model)
    }

    fn with_rng(
        encoder: E,
        tasks: &[TaskHeadConfig],
        rng: &mut StdRng,
    ) -> Result<Self, Error> {
        let hidden_size = encoder.hidden_size();
        let heads = tasks
            .iter()
            .map(|task| TaskHead::new(task.clone(), hidden_size, rng))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_heads(encoder, heads)
    }

    pub fn from_heads(
        encoder: E,
        heads: Vec<TaskHead>,
    ) -> Result<Self, Error> {
        if heads.is_empty() {
            return Err(ConfigError::NoTasks.into());
        }

        let hidden_size = encoder.hidden_size();
        let mut head_map = IndexMap::with_capacity(heads.len());
        for head in heads {
            if head.input_dim() != hidden_size {
                return Err(Error::ShapeMismatch {
                    context: format!("task head \"{}\" input", head.name()),
                    expected: vec![hidden_size],
                    actual: vec![head.input_dim()],
                });
            }
            let name = head.name().to_string();
            if head_map.contains_key(&name) {
                return Err(ConfigError::DuplicateTask(name).into());
            }
            head_map.insert(name, head);
        }

        tracing::info!(
            hidden_size,
            tasks = ?head_map.keys().collect::<Vec<_>>(),
            "Built multi-task model"
        );

        Ok(Self {
            encoder,
            heads: head_map,
            pretrained_model_name: DEFAULT_PRETRAINED_MODEL_NAME.to_string(),
            seed: 0,
        })
    }

    /// Records the pretrained name and seed from `config`.
    fn with_origin(
        mut self,
        config: &MultiTaskModelConfig,
    ) -> Self {
        self.pretrained_model_name = config.pretrained_model_name.clone();
        self.seed = config.seed;
        self
    }

    fn load_heads(
        tasks: impl IntoIterator<Item = TaskHeadConfig>,
        hidden_size: usize,
        tree: &ParameterTree<'_>,
    ) -> Result<Vec<TaskHead>, Error> {
        let heads_tree = tree.subtree(HEADS_PREFIX)?;
        tasks
            .into_iter()
            .map(|task| -> Result<TaskHead, Error> {
                let head_tree = heads_tree.subtree(&task.name)?;
                TaskHead::load(task, hidden_size, &head_tree)
            })
            .collect()
    }

    /// Encodes `sentences` once and runs every head on the shared representation.
    /// Returned logits keep the input order row for row.
    pub fn forward(
        &self,
        sentences: &[&str],
    ) -> Result<MultiTaskOutput, Error> {
        let run_start = Instant::now();

        let encode_start = Instant::now();
        let shared = self.encoder.encode(sentences)?;
        let encode_duration = encode_start.elapsed().as_secs_f64();

        let expected = [sentences.len(), self.hidden_size()];
        if shared.shape() != expected {
            return Err(Error::ShapeMismatch {
                context: "encoder output".to_string(),
                expected: expected.to_vec(),
                actual: shared.shape().to_vec(),
            });
        }

        let heads_start = Instant::now();
        let mut logits = IndexMap::with_capacity(self.heads.len());
        for (name, head) in &self.heads {
            logits.insert(name.clone(), head.forward(shared.view())?);
        }
        let heads_duration = heads_start.elapsed().as_secs_f64();

        let stats =
            ForwardStats::new(sentences.len(), encode_duration, heads_duration, run_start.elapsed().as_secs_f64());
        tracing::debug!(
            batch_size = stats.batch_size,
            encode_duration = stats.encode_duration,
            heads_duration = stats.heads_duration,
            "Forward pass finished"
        );

        Ok(MultiTaskOutput {
            logits,
            stats,
        })
    }

    /// `(logits_task_a, logits_task_b)` for the first two configured tasks.
    pub fn forward_pair(
        &self,
        sentences: &[&str],
    ) -> Result<(Array2<f32>, Array2<f32>), Error> {
        self.forward(sentences)?.into_pair()
    }

    /// Argmax predictions per task. Softmax is applied here, never in `forward`.
    pub fn predict(
        &self,
        sentences: &[&str],
    ) -> Result<IndexMap<String, Vec<Prediction>>, Error> {
        let output = self.forward(sentences)?;
        output
            .logits
            .iter()
            .map(|(name, logits)| {
                let labels = self.heads.get(name).and_then(TaskHead::output_labels);
                Ok((name.clone(), predictions(logits.view(), labels)?))
            })
            .collect()
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn encoder_mut(&mut self) -> &mut E {
        &mut self.encoder
    }

    pub fn hidden_size(&self) -> usize {
        self.encoder.hidden_size()
    }

    pub fn pretrained_model_name(&self) -> &str {
        &self.pretrained_model_name
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn head(
        &self,
        task: &str,
    ) -> Result<&TaskHead, Error> {
        self.heads.get(task).ok_or_else(|| Error::MissingTask(task.to_string()))
    }

    pub fn head_mut(
        &mut self,
        task: &str,
    ) -> Result<&mut TaskHead, Error> {
        self.heads.get_mut(task).ok_or_else(|| Error::MissingTask(task.to_string()))
    }

    pub fn heads(&self) -> impl Iterator<Item = &TaskHead> {
        self.heads.values()
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.heads.keys().map(String::as_str)
    }

    pub fn task_configs(&self) -> Vec<TaskHeadConfig> {
        self.heads.values().map(|head| head.config().clone()).collect()
    }

    pub fn save_parameters(
        &self,
        path: &Path,
    ) -> Result<(), Error> {
        let mut arrays = self.encoder.export_parameters();
        for (name, head) in &self.heads {
            arrays.extend(head.export_parameters(&format!("{HEADS_PREFIX}.{name}")));
        }
        let metadata = HashMap::from([
            ("format".to_string(), "multitask".to_string()),
            ("version".to_string(), VERSION.to_string()),
        ]);
        write_named_arrays(path, &arrays, Some(metadata))?;
        tracing::info!(path = %path.display(), tensors = arrays.len(), "Saved parameters");
        Ok(())
    }

    /// Replaces encoder and head parameters with the ones stored at `path`.
    /// Nothing is modified unless every head loads successfully.
    pub fn load_parameters(
        &mut self,
        path: &Path,
    ) -> Result<(), Error> {
        let file = File::open(path)?;
        let loader = ParameterLoader::new(&file)?;
        let tree = loader.tree();
        let loaded = Self::load_heads(self.task_configs(), self.hidden_size(), &tree)?;

        self.encoder.load_parameters(&tree)?;
        self.heads = loaded.into_iter().map(|head| (head.name().to_string(), head)).collect();
        tracing::info!(path = %path.display(), "Loaded parameters");
        Ok(())
    }
}

impl MultiTaskModel<PooledEmbeddingEncoder> {
    /// Builds a model with randomly initialized embeddings and heads.
    pub fn from_config(
        config: &MultiTaskModelConfig,
        tokenizer: Tokenizer,
    ) -> Result<Self, Error> {
        config.validate()?;
        let encoder_config = config.encoder_config()?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let encoder = PooledEmbeddingEncoder::random(encoder_config, tokenizer, &mut rng);
        Ok(Self::with_rng(encoder, &config.tasks, &mut rng)?.with_origin(config))
    }

    /// Loads `config.json`, `tokenizer.json` and `model.safetensors` from `model_path`.
    pub fn load(model_path: &Path) -> Result<Self, Error> {
        let config_path = model_path.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(Error::ModelFolderNotFound);
        }
        let config = MultiTaskModelConfig::from_file(&config_path)?;

        let tokenizer_path = model_path.join(TOKENIZER_FILE_NAME);
        if !tokenizer_path.exists() {
            return Err(Error::UnableToLoadTokenizer);
        }
        let tokenizer =
            PooledEmbeddingEncoder::load_tokenizer(&tokenizer_path).map_err(|_| Error::UnableToLoadTokenizer)?;

        let parameters_path = model_path.join(PARAMETERS_FILE_NAME);
        let file = File::open(&parameters_path)?;
        let loader = ParameterLoader::new(&file)?;
        let tree = loader.tree();
        let encoder = PooledEmbeddingEncoder::from_parameters(config.encoder_config()?, tokenizer, &tree)?;
        let heads = Self::load_heads(config.tasks.iter().cloned(), encoder.hidden_size(), &tree)?;

        let model = Self::from_heads(encoder, heads)?.with_origin(&config);
        tracing::info!(path = %parameters_path.display(), "Loaded parameters");
        Ok(model)
    }

    /// Configuration that rebuilds this model's structure, with the encoder
    /// dimensions spelled out.
    pub fn to_config(&self) -> MultiTaskModelConfig {
        MultiTaskModelConfig {
            pretrained_model_name: self.pretrained_model_name.clone(),
            encoder: Some(self.encoder.config().clone()),
            tasks: self.task_configs(),
            seed: self.seed,
        }
    }

    /// Writes everything [`MultiTaskModel::load`] needs into `model_path`.
    pub fn save(
        &self,
        model_path: &Path,
    ) -> Result<(), Error> {
        std::fs::create_dir_all(model_path)?;

        self.to_config().to_file(&model_path.join(CONFIG_FILE_NAME))?;

        self.encoder
            .tokenizer()
            .save(model_path.join(TOKENIZER_FILE_NAME), true)
            .map_err(|_| Error::UnableToSaveTokenizer)?;

        self.save_parameters(&model_path.join(PARAMETERS_FILE_NAME))
    }
}
