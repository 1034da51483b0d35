fn main() -> anyhow::Result<()> {
    citenet_cli::main_entry()
}
