mod tokio_runner;
