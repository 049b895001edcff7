mod common;

use multitask::{
    Error, MultiTaskModelConfig, PoolingType, SENTIMENT_TASK,
    encoder::{EncoderError, SentenceEncoder},
    model::{CONFIG_FILE_NAME, MultiTaskModel, PARAMETERS_FILE_NAME, TOKENIZER_FILE_NAME},
};

use crate::common::{small_encoder_config, word_level_tokenizer};

const SENTENCES: [&str; 2] = ["great product", "terrible service"];

fn small_config() -> MultiTaskModelConfig {
    MultiTaskModelConfig::default().with_encoder(small_encoder_config(16)).with_seed(11)
}

#[test]
fn test_from_config_runs_end_to_end() {
    let model = MultiTaskModel::from_config(&small_config(), word_level_tokenizer()).unwrap();
    assert_eq!(model.hidden_size(), 16);
    assert_eq!(model.encoder().config().pooling, PoolingType::Mean);

    let (logits_a, logits_b) = model.forward_pair(&SENTENCES).unwrap();
    assert_eq!(logits_a.dim(), (2, 3));
    assert_eq!(logits_b.dim(), (2, 2));
    assert_ne!(logits_a.row(0), logits_a.row(1));
}

#[test]
fn test_unknown_words_and_empty_input_encode() {
    let model = MultiTaskModel::from_config(&small_config(), word_level_tokenizer()).unwrap();
    let shared = model.encoder().encode(&["unseen", ""]).unwrap();
    assert_eq!(shared.dim(), (2, 16));
    assert!(shared.row(1).iter().all(|&x| x == 0.0));
    assert_eq!(shared.row(0), model.encoder().embeddings().row(0));
}

#[test]
fn test_model_directory_round_trip() {
    let directory = tempfile::tempdir().unwrap();
    let model_path = directory.path().join("model");

    let model = MultiTaskModel::from_config(&small_config(), word_level_tokenizer()).unwrap();
    model.save(&model_path).unwrap();
    for file_name in [CONFIG_FILE_NAME, TOKENIZER_FILE_NAME, PARAMETERS_FILE_NAME] {
        assert!(model_path.join(file_name).exists(), "{file_name} missing");
    }

    let restored = MultiTaskModel::load(&model_path).unwrap();
    assert_eq!(restored.task_names().collect::<Vec<_>>(), model.task_names().collect::<Vec<_>>());
    assert_eq!(restored.encoder().embeddings(), model.encoder().embeddings());
    assert_eq!(restored.forward(&SENTENCES).unwrap().logits, model.forward(&SENTENCES).unwrap().logits);
}

#[test]
fn test_loaded_config_keeps_labels() {
    let directory = tempfile::tempdir().unwrap();
    let mut config =
        MultiTaskModelConfig::new("bert-large-uncased", 3, 2).with_encoder(small_encoder_config(16)).with_seed(42);
    config.tasks[1] = config.tasks[1].clone().with_output_labels(vec!["negative".to_string(), "positive".to_string()]);

    let model = MultiTaskModel::from_config(&config, word_level_tokenizer()).unwrap();
    assert_eq!(model.to_config(), config);
    model.save(directory.path()).unwrap();

    let saved = MultiTaskModelConfig::from_file(&directory.path().join(CONFIG_FILE_NAME)).unwrap();
    assert_eq!(saved.pretrained_model_name, "bert-large-uncased");
    assert_eq!(saved.seed, 42);
    assert_eq!(saved.tasks, config.tasks);
    assert_eq!(saved.encoder, config.encoder);

    let restored = MultiTaskModel::load(directory.path()).unwrap();
    assert_eq!(restored.pretrained_model_name(), "bert-large-uncased");
    assert_eq!(restored.seed(), 42);
    assert_eq!(restored.head(SENTIMENT_TASK).unwrap().output_labels().unwrap(), ["negative", "positive"]);
    assert_eq!(restored.to_config(), config);
}

#[test]
fn test_load_uses_stored_embedding_table() {
    let directory = tempfile::tempdir().unwrap();
    let model = MultiTaskModel::from_config(&small_config(), word_level_tokenizer()).unwrap();
    model.save(directory.path()).unwrap();

    let config_path = directory.path().join(CONFIG_FILE_NAME);
    let mut config = MultiTaskModelConfig::from_file(&config_path).unwrap();
    config.encoder = Some(small_encoder_config(8));
    config.to_file(&config_path).unwrap();

    assert!(matches!(
        MultiTaskModel::load(directory.path()),
        Err(Error::Encoder(EncoderError::InvalidEmbeddingShape {
            expected_hidden_size: 8,
            ..
        }))
    ));
}

#[test]
fn test_unreadable_tokenizer_is_reported() {
    let directory = tempfile::tempdir().unwrap();
    let model = MultiTaskModel::from_config(&small_config(), word_level_tokenizer()).unwrap();
    model.save(directory.path()).unwrap();
    std::fs::write(directory.path().join(TOKENIZER_FILE_NAME), "not a tokenizer").unwrap();

    assert!(matches!(MultiTaskModel::load(directory.path()), Err(Error::UnableToLoadTokenizer)));
}

#[test]
fn test_missing_model_folder() {
    let directory = tempfile::tempdir().unwrap();
    assert!(matches!(MultiTaskModel::load(&directory.path().join("absent")), Err(Error::ModelFolderNotFound)));
}

#[test]
fn test_unknown_pretrained_model_is_rejected() {
    let config = MultiTaskModelConfig::new("not-a-model", 3, 2);
    assert!(matches!(
        MultiTaskModel::from_config(&config, word_level_tokenizer()),
        Err(Error::Config(multitask::ConfigError::UnknownPretrainedModel(_)))
    ));
}
