fn main() -> anyhow::Result<()> {
    inputroute_daemon::run()
}
