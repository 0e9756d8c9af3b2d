fn main() -> anyhow::Result<()> {
    duplicati_log_viewer::run()
}
