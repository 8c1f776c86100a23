fn main() -> anyhow::Result<()> {
    jdm::cli::run()
}
